use sqlx::{FromRow, SqliteConnection};

use crate::{
    error::{ForumError, Result},
    models::{PostId, ReplyId, ReplySummary, UserId},
    timeago,
};

use super::{Store, posts};

#[derive(Debug, FromRow)]
struct ReplyRow {
    reply_id: i64,
    post_id: i64,
    content: String,
    number_of_likes: i64,
    created_time: Option<String>,
    user_name: String,
}

impl Store {
    /// Flat, oldest first. Replies carry no parent reference.
    pub async fn list_replies(&self, post_id: PostId) -> Result<Vec<ReplySummary>> {
        let rows: Vec<ReplyRow> = sqlx::query_as(
            r#"SELECT r.reply_id, r.post_id, r.content, r.number_of_likes, r.created_time,
                      u.user_name
            FROM Replies r
            JOIN Users u ON r.user_id = u.user_id
            WHERE r.post_id = ?
            ORDER BY r.created_time ASC, r.reply_id ASC"#,
        )
        .bind(post_id)
        .fetch_all(&self.db_pool)
        .await?;

        let now = timeago::now_utc();
        Ok(rows
            .into_iter()
            .map(|row| ReplySummary {
                time_ago: timeago::describe(row.created_time.as_deref(), now),
                reply_id: row.reply_id,
                post_id: row.post_id,
                author: row.user_name,
                content: row.content,
                likes: row.number_of_likes,
                created_time: row.created_time,
            })
            .collect())
    }

    /// Inserts the reply, then recomputes the post's reply count from scratch.
    pub async fn create_reply(&self, post_id: PostId, user_id: UserId, content: &str) -> Result<ReplyId> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ForumError::validation("reply must not be empty"));
        }

        let mut conn = self.db_pool.acquire().await?;
        if !posts::exists(&mut *conn, post_id).await? {
            return Err(ForumError::not_found("post", post_id));
        }

        let result = sqlx::query(
            "INSERT INTO Replies (post_id, user_id, content, number_of_likes, created_time) VALUES (?, ?, ?, 0, CURRENT_TIMESTAMP)",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .execute(&mut *conn)
        .await
        .map_err(|e| ForumError::constraint_or_storage(e, "unknown author"))?;

        recount_replies(&mut *conn, post_id).await?;
        Ok(result.last_insert_rowid())
    }
}

/// The only writer of `Posts.number_of_replies`.
pub(crate) async fn recount_replies(conn: &mut SqliteConnection, post_id: PostId) -> Result<()> {
    sqlx::query(
        r#"UPDATE Posts
        SET number_of_replies = (SELECT COUNT(*) FROM Replies WHERE post_id = ?)
        WHERE post_id = ?"#,
    )
    .bind(post_id)
    .bind(post_id)
    .execute(conn)
    .await?;
    Ok(())
}
