use sqlx::{FromRow, SqliteConnection};
use time::PrimitiveDateTime;
use tracing::debug;

use crate::{
    error::{ForumError, Result},
    models::{NewPost, PostId, PostSummary, UserId, VoteState},
    timeago,
};

use super::Store;

/// Every feed query selects the same columns. The viewer's vote rides along
/// through the left join, bound as the first parameter.
const POST_SUMMARY_SELECT: &str = r#"
    SELECT p.post_id,
           p.title,
           p.content,
           p.tag,
           p.number_of_likes,
           p.number_of_replies,
           p.created_time,
           u.user_name,
           c.community_name,
           v.vote_type
    FROM Posts p
    JOIN Users u       ON p.user_id = u.user_id
    JOIN Communities c ON p.community_id = c.community_id
    LEFT JOIN Post_Votes v ON v.post_id = p.post_id AND v.user_id = ?
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chronology {
    NewestFirst,
    OldestFirst,
}

/// Whether a like-count adjustment may take the count below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeFloor {
    Zero,
    Unbounded,
}

#[derive(Debug, FromRow)]
struct PostRow {
    post_id: i64,
    title: String,
    content: String,
    tag: Option<String>,
    number_of_likes: i64,
    number_of_replies: i64,
    created_time: Option<String>,
    user_name: String,
    community_name: String,
    vote_type: Option<i64>,
}

impl PostRow {
    fn into_summary(self, now: PrimitiveDateTime) -> PostSummary {
        let time_ago = timeago::describe(self.created_time.as_deref(), now);
        PostSummary {
            post_id: self.post_id,
            community: self.community_name,
            author: self.user_name,
            title: self.title,
            content: self.content,
            tag: self.tag.filter(|tag| !tag.trim().is_empty()),
            likes: self.number_of_likes,
            replies: self.number_of_replies,
            created_time: self.created_time,
            time_ago,
            my_vote: VoteState::from_stored(self.vote_type),
        }
    }
}

fn summarize(rows: Vec<PostRow>) -> Vec<PostSummary> {
    let now = timeago::now_utc();
    rows.into_iter().map(|row| row.into_summary(now)).collect()
}

impl Store {
    /// Posts from the communities `user_id` has joined, newest first.
    pub async fn home_posts(&self, user_id: UserId) -> Result<Vec<PostSummary>> {
        let sql = format!(
            "{POST_SUMMARY_SELECT}
            JOIN Community_User cu ON c.community_id = cu.community_id
            WHERE cu.user_id = ?
            ORDER BY p.created_time DESC, p.post_id DESC"
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.db_pool)
            .await?;

        debug!("loaded {} home posts for user {user_id}", rows.len());
        Ok(summarize(rows))
    }

    /// Every post, most liked first, newer first among equals.
    pub async fn posts_by_likes(&self, viewer: UserId) -> Result<Vec<PostSummary>> {
        let sql = format!(
            "{POST_SUMMARY_SELECT}
            ORDER BY p.number_of_likes DESC, p.created_time DESC, p.post_id DESC"
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(viewer)
            .fetch_all(&self.db_pool)
            .await?;

        debug!("loaded {} posts sorted by likes", rows.len());
        Ok(summarize(rows))
    }

    pub async fn posts_by_time(&self, viewer: UserId, order: Chronology) -> Result<Vec<PostSummary>> {
        let direction = match order {
            Chronology::NewestFirst => "DESC",
            Chronology::OldestFirst => "ASC",
        };
        let sql = format!(
            "{POST_SUMMARY_SELECT}
            ORDER BY p.created_time {direction}, p.post_id {direction}"
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(viewer)
            .fetch_all(&self.db_pool)
            .await?;

        debug!("loaded {} posts sorted by time ({direction})", rows.len());
        Ok(summarize(rows))
    }

    pub async fn get_post(&self, post_id: PostId, viewer: UserId) -> Result<Option<PostSummary>> {
        let sql = format!("{POST_SUMMARY_SELECT} WHERE p.post_id = ?");
        let row: Option<PostRow> = sqlx::query_as(&sql)
            .bind(viewer)
            .bind(post_id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(row.map(|row| row.into_summary(timeago::now_utc())))
    }

    /// Inserts a post with both counters at zero. A blank tag is stored as NULL.
    pub async fn create_post(&self, post: &NewPost) -> Result<PostId> {
        let title = post.title.trim();
        let content = post.content.trim();
        if title.is_empty() {
            return Err(ForumError::validation("post title must not be empty"));
        }
        if content.is_empty() {
            return Err(ForumError::validation("post body must not be empty"));
        }
        let tag = post
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty());

        let result = sqlx::query(
            r#"INSERT INTO Posts
                (community_id, user_id, title, content, number_of_likes, number_of_replies, created_time, tag)
            VALUES (?, ?, ?, ?, 0, 0, CURRENT_TIMESTAMP, ?)"#,
        )
        .bind(post.community_id)
        .bind(post.user_id)
        .bind(title)
        .bind(content)
        .bind(tag)
        .execute(&self.db_pool)
        .await
        .map_err(|e| ForumError::constraint_or_storage(e, "unknown community or author"))?;

        Ok(result.last_insert_rowid())
    }

    /// Distinct non-blank tags, for the Explore tag filter.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let tags: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT tag FROM Posts WHERE tag IS NOT NULL AND TRIM(tag) <> '' ORDER BY tag",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(tags.into_iter().map(|(tag,)| tag).collect())
    }

    pub async fn like_count(&self, post_id: PostId) -> Result<Option<i64>> {
        let mut conn = self.db_pool.acquire().await?;
        like_count(&mut *conn, post_id).await
    }
}

pub(crate) async fn exists(conn: &mut SqliteConnection, post_id: PostId) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM Posts WHERE post_id = ?")
        .bind(post_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub(crate) async fn like_count(conn: &mut SqliteConnection, post_id: PostId) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT number_of_likes FROM Posts WHERE post_id = ?")
        .bind(post_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|(likes,)| likes))
}

/// The only writer of `Posts.number_of_likes`.
pub(crate) async fn adjust_likes(
    conn: &mut SqliteConnection,
    post_id: PostId,
    delta: i64,
    floor: LikeFloor,
) -> Result<()> {
    let sql = match floor {
        LikeFloor::Zero => "UPDATE Posts SET number_of_likes = MAX(number_of_likes + ?, 0) WHERE post_id = ?",
        LikeFloor::Unbounded => "UPDATE Posts SET number_of_likes = number_of_likes + ? WHERE post_id = ?",
    };

    let result = sqlx::query(sql)
        .bind(delta)
        .bind(post_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ForumError::not_found("post", post_id));
    }

    Ok(())
}
