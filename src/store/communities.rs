use std::collections::BTreeSet;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::info;

use crate::{
    error::{ForumError, Result},
    models::{Community, CommunityId, UserId},
};

use super::Store;

/// Moderator recorded on communities created on demand from a course name.
pub const PLACEHOLDER_MODERATOR: UserId = 1;

impl Store {
    pub async fn list_communities(&self) -> Result<Vec<Community>> {
        Ok(sqlx::query_as(
            "SELECT community_id, community_name AS name, moderator_id FROM Communities ORDER BY community_name",
        )
        .fetch_all(&self.db_pool)
        .await?)
    }

    pub async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>> {
        Ok(sqlx::query_as(
            "SELECT community_id, community_name AS name, moderator_id FROM Communities WHERE community_name = ?",
        )
        .bind(name.trim())
        .fetch_optional(&self.db_pool)
        .await?)
    }

    pub async fn membership_ids(&self, user_id: UserId) -> Result<BTreeSet<CommunityId>> {
        let mut conn = self.db_pool.acquire().await?;
        membership_ids(&mut *conn, user_id).await
    }

    pub async fn has_memberships(&self, user_id: UserId) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM Community_User WHERE user_id = ? LIMIT 1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.is_some())
    }
}

/// Returns the id of the community called `name`, creating it if needed.
pub(crate) async fn ensure_community(conn: &mut SqliteConnection, name: &str) -> Result<CommunityId> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ForumError::validation("community name must not be empty"));
    }

    let inserted = sqlx::query("INSERT OR IGNORE INTO Communities (community_name, moderator_id) VALUES (?, ?)")
        .bind(name)
        .bind(PLACEHOLDER_MODERATOR)
        .execute(&mut *conn)
        .await?;
    if inserted.rows_affected() > 0 {
        info!("created community {name:?}");
    }

    let (community_id,): (i64,) = sqlx::query_as("SELECT community_id FROM Communities WHERE community_name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(community_id)
}

/// Which of `ids` name an existing community.
pub(crate) async fn existing_ids(
    conn: &mut SqliteConnection,
    ids: &BTreeSet<CommunityId>,
) -> Result<BTreeSet<CommunityId>> {
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT community_id FROM Communities WHERE community_id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<(i64,)> = query.build_query_as().fetch_all(conn).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub(crate) async fn membership_ids(conn: &mut SqliteConnection, user_id: UserId) -> Result<BTreeSet<CommunityId>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT community_id FROM Community_User WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Batched insert-or-ignore of `(community, user)` edges.
pub(crate) async fn add_memberships(
    conn: &mut SqliteConnection,
    user_id: UserId,
    community_ids: &BTreeSet<CommunityId>,
) -> Result<()> {
    if community_ids.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO Community_User (community_id, user_id) ");
    query.push_values(community_ids, |mut row, community_id| {
        row.push_bind(*community_id).push_bind(user_id);
    });
    query.build().execute(conn).await?;
    Ok(())
}

/// Batched delete of the user's edges to `community_ids`.
pub(crate) async fn remove_memberships(
    conn: &mut SqliteConnection,
    user_id: UserId,
    community_ids: &BTreeSet<CommunityId>,
) -> Result<()> {
    if community_ids.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM Community_User WHERE user_id = ");
    query.push_bind(user_id).push(" AND community_id IN (");
    let mut separated = query.separated(", ");
    for community_id in community_ids {
        separated.push_bind(*community_id);
    }
    separated.push_unseparated(")");

    query.build().execute(conn).await?;
    Ok(())
}
