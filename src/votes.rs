//! Per-user, per-post vote state machine.
//!
//! | stored | requested | next  | like delta | floor      | applied |
//! |--------|-----------|-------|------------|------------|---------|
//! | none   | up        | up    | +1         | unbounded  | yes     |
//! | none   | down      | down  | -1         | zero       | yes     |
//! | up     | up        | none  | -1         | zero       | no      |
//! | down   | down      | none  | +1         | unbounded  | no      |
//! | down   | up        | up    | +2         | unbounded  | yes     |
//! | up     | down      | down  | -2         | unbounded  | yes     |

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::{ForumError, Result},
    models::{PostId, UserId, VoteDirection, VoteOutcome, VoteState},
    store::{LikeFloor, Store, posts, users, votes},
};

/// Row change a transition makes to `Post_Votes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWrite {
    Insert(VoteDirection),
    Delete,
    Update(VoteDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub write: VoteWrite,
    pub next: VoteState,
    pub delta: i64,
    pub floor: LikeFloor,
    pub applied: bool,
}

impl Transition {
    pub fn plan(current: VoteState, requested: VoteDirection) -> Self {
        use VoteDirection::*;

        match (current.direction(), requested) {
            (None, Up) => Self {
                write: VoteWrite::Insert(Up),
                next: VoteState::Up,
                delta: 1,
                floor: LikeFloor::Unbounded,
                applied: true,
            },
            (None, Down) => Self {
                write: VoteWrite::Insert(Down),
                next: VoteState::Down,
                delta: -1,
                floor: LikeFloor::Zero,
                applied: true,
            },
            (Some(Up), Up) => Self {
                write: VoteWrite::Delete,
                next: VoteState::None,
                delta: -1,
                floor: LikeFloor::Zero,
                applied: false,
            },
            (Some(Down), Down) => Self {
                write: VoteWrite::Delete,
                next: VoteState::None,
                delta: 1,
                floor: LikeFloor::Unbounded,
                applied: false,
            },
            (Some(Down), Up) => Self {
                write: VoteWrite::Update(Up),
                next: VoteState::Up,
                delta: 2,
                floor: LikeFloor::Unbounded,
                applied: true,
            },
            (Some(Up), Down) => Self {
                write: VoteWrite::Update(Down),
                next: VoteState::Down,
                delta: -2,
                floor: LikeFloor::Unbounded,
                applied: true,
            },
        }
    }
}

/// Applies votes one at a time. Clones share the same lock.
#[derive(Clone, Debug)]
pub struct VoteEngine {
    store: Store,
    lock: Arc<Mutex<()>>,
}

impl VoteEngine {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn vote_state(&self, post_id: PostId, user_id: UserId) -> Result<VoteState> {
        self.store.vote_state(post_id, user_id).await
    }

    /// Casts, removes or flips `user_id`'s vote on `post_id` and returns the
    /// like-count as stored afterwards. An unknown post or user changes nothing.
    pub async fn apply_vote(
        &self,
        post_id: PostId,
        user_id: UserId,
        direction: VoteDirection,
    ) -> Result<VoteOutcome> {
        let _guard = self.lock.lock().await;
        let mut tx = self.store.begin().await?;

        if !posts::exists(&mut *tx, post_id).await? || !users::exists(&mut *tx, user_id).await? {
            warn!("vote on post {post_id} by user {user_id} ignored: no such post or user");
            return Ok(VoteOutcome {
                applied: false,
                new_count: 0,
            });
        }

        let current = votes::find_vote(&mut *tx, post_id, user_id).await?;
        let transition = Transition::plan(current, direction);

        match transition.write {
            VoteWrite::Insert(dir) => votes::insert_vote(&mut *tx, post_id, user_id, dir).await?,
            VoteWrite::Delete => votes::delete_vote(&mut *tx, post_id, user_id).await?,
            VoteWrite::Update(dir) => votes::set_vote(&mut *tx, post_id, user_id, dir).await?,
        }
        posts::adjust_likes(&mut *tx, post_id, transition.delta, transition.floor).await?;

        let new_count = posts::like_count(&mut *tx, post_id)
            .await?
            .ok_or(ForumError::not_found("post", post_id))?;

        tx.commit().await?;

        debug!(
            "vote {direction:?} on post {post_id} by user {user_id}: {current:?} -> {:?}, likes now {new_count}",
            transition.next
        );
        Ok(VoteOutcome {
            applied: transition.applied,
            new_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_votes_insert() {
        let up = Transition::plan(VoteState::None, VoteDirection::Up);
        assert_eq!(up.write, VoteWrite::Insert(VoteDirection::Up));
        assert_eq!((up.delta, up.floor, up.applied), (1, LikeFloor::Unbounded, true));

        let down = Transition::plan(VoteState::None, VoteDirection::Down);
        assert_eq!(down.write, VoteWrite::Insert(VoteDirection::Down));
        assert_eq!((down.delta, down.floor, down.applied), (-1, LikeFloor::Zero, true));
    }

    #[test]
    fn repeating_a_vote_removes_it() {
        let up = Transition::plan(VoteState::Up, VoteDirection::Up);
        assert_eq!(up.write, VoteWrite::Delete);
        assert_eq!(up.next, VoteState::None);
        assert_eq!((up.delta, up.floor, up.applied), (-1, LikeFloor::Zero, false));

        let down = Transition::plan(VoteState::Down, VoteDirection::Down);
        assert_eq!(down.write, VoteWrite::Delete);
        assert_eq!((down.delta, down.floor, down.applied), (1, LikeFloor::Unbounded, false));
    }

    #[test]
    fn flips_are_never_clamped() {
        let to_up = Transition::plan(VoteState::Down, VoteDirection::Up);
        assert_eq!(to_up.write, VoteWrite::Update(VoteDirection::Up));
        assert_eq!((to_up.delta, to_up.floor), (2, LikeFloor::Unbounded));

        let to_down = Transition::plan(VoteState::Up, VoteDirection::Down);
        assert_eq!(to_down.write, VoteWrite::Update(VoteDirection::Down));
        assert_eq!(to_down.next, VoteState::Down);
        assert_eq!((to_down.delta, to_down.floor), (-2, LikeFloor::Unbounded));
    }
}
