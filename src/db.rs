use std::str::FromStr;

use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use crate::{
    error::Result,
    store::{communities, replies},
};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS Users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_name TEXT NOT NULL UNIQUE,
        PasswordHash TEXT NOT NULL,
        Email TEXT NOT NULL UNIQUE,
        LinkedInURL TEXT,
        GitHubURL TEXT,
        Department TEXT
    )"#,
    // moderator_id is advisory only; communities are auto-created with a placeholder
    r#"CREATE TABLE IF NOT EXISTS Communities (
        community_id INTEGER PRIMARY KEY AUTOINCREMENT,
        community_name TEXT NOT NULL UNIQUE,
        moderator_id INTEGER
    )"#,
    r#"CREATE TABLE IF NOT EXISTS Community_User (
        community_id INTEGER NOT NULL REFERENCES Communities(community_id),
        user_id INTEGER NOT NULL REFERENCES Users(user_id),
        PRIMARY KEY (community_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS Posts (
        post_id INTEGER PRIMARY KEY AUTOINCREMENT,
        community_id INTEGER NOT NULL REFERENCES Communities(community_id),
        user_id INTEGER NOT NULL REFERENCES Users(user_id),
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        tag TEXT,
        number_of_likes INTEGER NOT NULL DEFAULT 0,
        number_of_replies INTEGER NOT NULL DEFAULT 0,
        created_time TEXT DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS Replies (
        reply_id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id INTEGER NOT NULL REFERENCES Posts(post_id),
        user_id INTEGER NOT NULL REFERENCES Users(user_id),
        content TEXT NOT NULL,
        number_of_likes INTEGER NOT NULL DEFAULT 0,
        created_time TEXT DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS Post_Votes (
        post_id INTEGER NOT NULL REFERENCES Posts(post_id),
        user_id INTEGER NOT NULL REFERENCES Users(user_id),
        vote_type INTEGER NOT NULL CHECK (vote_type IN (1, -1)),
        PRIMARY KEY (post_id, user_id)
    )"#,
];

pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates any missing tables. Safe to call on every start.
pub async fn init_schema(db_pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(db_pool).await?;
    }

    info!("schema ready ({} tables)", SCHEMA.len());
    Ok(())
}

/// Fills a database with no users yet with a few users, communities, posts and
/// replies. Communities that already exist are reused by name.
pub async fn seed_demo(db_pool: &SqlitePool) -> Result<()> {
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Users")
        .fetch_one(db_pool)
        .await?;
    if users > 0 {
        info!("skipping demo seed, {users} users already present");
        return Ok(());
    }

    let mut tx = db_pool.begin().await?;

    let ada = insert_demo_user(&mut *tx, "ada").await?;
    let grace = insert_demo_user(&mut *tx, "grace").await?;
    let linus = insert_demo_user(&mut *tx, "linus").await?;

    let cs5010 = communities::ensure_community(&mut *tx, "CS 5010").await?;
    let cs5800 = communities::ensure_community(&mut *tx, "CS 5800").await?;
    let info6150 = communities::ensure_community(&mut *tx, "INFO 6150").await?;

    for (community_id, user_id) in [(cs5010, ada), (cs5800, ada), (cs5010, grace), (info6150, linus)] {
        sqlx::query("INSERT OR IGNORE INTO Community_User (community_id, user_id) VALUES (?, ?)")
            .bind(community_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    let posts = [
        (cs5010, grace, "Midterm exam scope?", "Does the exam cover design patterns?", Some("exam")),
        (cs5010, ada, "Study group Thursday", "Library room 204, bring **laptops**.", Some("meetup")),
        (cs5800, ada, "Dynamic programming tips", "Start from the recurrence, then memoize.", None),
        (info6150, linus, "CSS grid vs flexbox", "When do you reach for grid?", Some("question")),
    ];
    let mut first_post = None;
    for (community_id, user_id, title, content, tag) in posts {
        let result = sqlx::query("INSERT INTO Posts (community_id, user_id, title, content, tag) VALUES (?, ?, ?, ?, ?)")
            .bind(community_id)
            .bind(user_id)
            .bind(title)
            .bind(content)
            .bind(tag)
            .execute(&mut *tx)
            .await?;
        first_post.get_or_insert(result.last_insert_rowid());
    }

    if let Some(post_id) = first_post {
        sqlx::query("INSERT INTO Replies (post_id, user_id, content) VALUES (?, ?, 'Chapters 1 through 6.')")
            .bind(post_id)
            .bind(ada)
            .execute(&mut *tx)
            .await?;
        replies::recount_replies(&mut *tx, post_id).await?;
    }

    tx.commit().await?;
    info!("seeded demo data");
    Ok(())
}

async fn insert_demo_user(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Users (user_name, PasswordHash, Email) VALUES (?, '!', ?)")
        .bind(name)
        .bind(format!("{name}@example.edu"))
        .execute(conn)
        .await?;
    Ok(result.last_insert_rowid())
}
