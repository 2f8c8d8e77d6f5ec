use sqlx::SqliteConnection;

use crate::{
    error::Result,
    models::{PostId, UserId, VoteDirection, VoteState},
};

use super::Store;

impl Store {
    pub async fn vote_state(&self, post_id: PostId, user_id: UserId) -> Result<VoteState> {
        let mut conn = self.db_pool.acquire().await?;
        find_vote(&mut *conn, post_id, user_id).await
    }
}

pub(crate) async fn find_vote(
    conn: &mut SqliteConnection,
    post_id: PostId,
    user_id: UserId,
) -> Result<VoteState> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT vote_type FROM Post_Votes WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(VoteState::from_stored(row.map(|(vote_type,)| vote_type)))
}

pub(crate) async fn insert_vote(
    conn: &mut SqliteConnection,
    post_id: PostId,
    user_id: UserId,
    direction: VoteDirection,
) -> Result<()> {
    sqlx::query("INSERT INTO Post_Votes (post_id, user_id, vote_type) VALUES (?, ?, ?)")
        .bind(post_id)
        .bind(user_id)
        .bind(direction.value())
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn set_vote(
    conn: &mut SqliteConnection,
    post_id: PostId,
    user_id: UserId,
    direction: VoteDirection,
) -> Result<()> {
    sqlx::query("UPDATE Post_Votes SET vote_type = ? WHERE post_id = ? AND user_id = ?")
        .bind(direction.value())
        .bind(post_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn delete_vote(conn: &mut SqliteConnection, post_id: PostId, user_id: UserId) -> Result<()> {
    sqlx::query("DELETE FROM Post_Votes WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
