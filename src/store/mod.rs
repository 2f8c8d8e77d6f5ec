//! Persistence adapter over the forum's SQLite file.
//!
//! Pool-level reads and single-statement writes are methods on [`Store`]. The
//! statements the vote and membership transactions are built from take a
//! `&mut SqliteConnection` so they run inside the caller's transaction.
//!
//! Each denormalized counter has exactly one writer:
//! `Posts.number_of_likes` is adjusted incrementally by [`posts::adjust_likes`],
//! `Posts.number_of_replies` is recomputed by [`replies::recount_replies`].

pub mod communities;
pub mod posts;
pub mod replies;
pub mod users;
pub mod votes;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::Result;

pub use posts::{Chronology, LikeFloor};

#[derive(Clone, Debug)]
pub struct Store {
    db_pool: SqlitePool,
}

impl Store {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub(crate) async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.db_pool.begin().await?)
    }
}
