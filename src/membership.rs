use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{info, warn};

use crate::{
    error::{ForumError, Result},
    models::{CommunityId, UserId},
    store::{Store, communities, users},
};

/// Edges written by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipDiff {
    pub added: BTreeSet<CommunityId>,
    pub removed: BTreeSet<CommunityId>,
}

impl MembershipDiff {
    pub fn between(current: &BTreeSet<CommunityId>, desired: &BTreeSet<CommunityId>) -> Self {
        Self {
            added: desired.difference(current).copied().collect(),
            removed: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct MembershipManager {
    store: Store,
}

impl MembershipManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get_membership(&self, user_id: UserId) -> Result<BTreeSet<CommunityId>> {
        self.store.membership_ids(user_id).await
    }

    /// A user with no communities still has to pick courses.
    pub async fn has_joined_any(&self, user_id: UserId) -> Result<bool> {
        self.store.has_memberships(user_id).await
    }

    pub async fn ensure_community(&self, name: &str) -> Result<CommunityId> {
        let mut conn = self.store.pool().acquire().await?;
        communities::ensure_community(&mut *conn, name).await
    }

    /// Makes the user's memberships exactly `desired`. An empty set leaves every
    /// community. Ids with no community behind them are skipped.
    pub async fn reconcile_memberships(
        &self,
        user_id: UserId,
        desired: &BTreeSet<CommunityId>,
    ) -> Result<MembershipDiff> {
        let mut tx = self.store.begin().await?;
        let diff = reconcile_in(&mut *tx, user_id, desired).await?;
        tx.commit().await?;
        Ok(diff)
    }

    /// Like [`Self::reconcile_memberships`], by course name. Names with no
    /// community yet get one, moderated by the placeholder user.
    pub async fn reconcile_memberships_by_name<S: AsRef<str>>(
        &self,
        user_id: UserId,
        names: &[S],
    ) -> Result<MembershipDiff> {
        let mut tx = self.store.begin().await?;

        let mut desired = BTreeSet::new();
        for name in names {
            desired.insert(communities::ensure_community(&mut *tx, name.as_ref()).await?);
        }
        let diff = reconcile_in(&mut *tx, user_id, &desired).await?;

        tx.commit().await?;
        Ok(diff)
    }
}

async fn reconcile_in(
    conn: &mut SqliteConnection,
    user_id: UserId,
    desired: &BTreeSet<CommunityId>,
) -> Result<MembershipDiff> {
    if !users::exists(&mut *conn, user_id).await? {
        return Err(ForumError::not_found("user", user_id));
    }

    let known = communities::existing_ids(&mut *conn, desired).await?;
    if known.len() != desired.len() {
        let unknown: Vec<_> = desired.difference(&known).collect();
        warn!("user {user_id}: skipping unknown communities {unknown:?}");
    }

    let current = communities::membership_ids(&mut *conn, user_id).await?;
    let diff = MembershipDiff::between(&current, &known);
    if diff.is_noop() {
        return Ok(diff);
    }

    communities::remove_memberships(&mut *conn, user_id, &diff.removed).await?;
    communities::add_memberships(&mut *conn, user_id, &diff.added).await?;

    info!(
        "user {user_id} memberships: +{:?} -{:?}",
        diff.added, diff.removed
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn diff_splits_adds_and_removes() {
        let diff = MembershipDiff::between(&set(&[1, 2, 3]), &set(&[2, 3, 4, 5]));
        assert_eq!(diff.added, set(&[4, 5]));
        assert_eq!(diff.removed, set(&[1]));
        assert!(!diff.is_noop());
    }

    #[test]
    fn same_sets_are_a_noop() {
        assert!(MembershipDiff::between(&set(&[1, 2]), &set(&[2, 1])).is_noop());
        assert!(MembershipDiff::between(&set(&[]), &set(&[])).is_noop());
    }

    #[test]
    fn empty_desired_removes_everything() {
        let diff = MembershipDiff::between(&set(&[7, 8]), &set(&[]));
        assert_eq!(diff.removed, set(&[7, 8]));
        assert!(diff.added.is_empty());
    }
}
