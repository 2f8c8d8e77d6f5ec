use sqlx::SqliteConnection;
use tracing::info;

use crate::{
    error::{ForumError, Result},
    models::{ProfileUpdate, User, UserId},
};

use super::Store;

const USER_SELECT: &str = r#"
    SELECT user_id,
           user_name AS username,
           PasswordHash AS password_hash,
           Email AS email,
           LinkedInURL AS linkedin_url,
           GitHubURL AS github_url,
           Department AS department
    FROM Users
"#;

const TAKEN: &str = "username or email already exists";

impl Store {
    /// Registers a user. The password hash is opaque to the forum.
    pub async fn create_user(&self, username: &str, password_hash: &str, email: &str) -> Result<UserId> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() {
            return Err(ForumError::validation("username and email are required"));
        }

        let result = sqlx::query("INSERT INTO Users (user_name, PasswordHash, Email) VALUES (?, ?, ?)")
            .bind(username)
            .bind(password_hash)
            .bind(email)
            .execute(&self.db_pool)
            .await
            .map_err(|e| ForumError::constraint_or_storage(e, TAKEN))?;

        let user_id = result.last_insert_rowid();
        info!("registered @{username}#{user_id}");
        Ok(user_id)
    }

    pub async fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE user_id = ?");
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    pub async fn find_user_by_name(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE user_name = ?");
        Ok(sqlx::query_as(&sql)
            .bind(username.trim())
            .fetch_optional(&self.db_pool)
            .await?)
    }

    /// Applies the `Some` fields of `update`. Blank optional profile links are
    /// stored as NULL.
    pub async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> Result<User> {
        if let Some(username) = update.username.as_deref() {
            if username.trim().is_empty() {
                return Err(ForumError::validation("username must not be empty"));
            }
            if let Some(existing) = self.find_user_by_name(username).await? {
                if existing.user_id != user_id {
                    return Err(ForumError::validation(
                        "username already exists, please choose a different one",
                    ));
                }
            }
        }
        if update.email.as_deref().is_some_and(|email| email.trim().is_empty()) {
            return Err(ForumError::validation("email must not be empty"));
        }

        // Some("") clears an optional column, None keeps it
        fn clearable(field: &Option<String>) -> (bool, Option<&str>) {
            match field.as_deref().map(str::trim) {
                None => (false, None),
                Some("") => (true, None),
                Some(value) => (true, Some(value)),
            }
        }
        let (set_linkedin, linkedin) = clearable(&update.linkedin_url);
        let (set_github, github) = clearable(&update.github_url);
        let (set_department, department) = clearable(&update.department);

        let result = sqlx::query(
            r#"UPDATE Users SET
                user_name    = COALESCE(?, user_name),
                Email        = COALESCE(?, Email),
                PasswordHash = COALESCE(?, PasswordHash),
                LinkedInURL  = CASE WHEN ? THEN ? ELSE LinkedInURL END,
                GitHubURL    = CASE WHEN ? THEN ? ELSE GitHubURL END,
                Department   = CASE WHEN ? THEN ? ELSE Department END
            WHERE user_id = ?"#,
        )
        .bind(update.username.as_deref().map(str::trim))
        .bind(update.email.as_deref().map(str::trim))
        .bind(update.password_hash.as_deref())
        .bind(set_linkedin)
        .bind(linkedin)
        .bind(set_github)
        .bind(github)
        .bind(set_department)
        .bind(department)
        .bind(user_id)
        .execute(&self.db_pool)
        .await
        .map_err(|e| ForumError::constraint_or_storage(e, TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(ForumError::not_found("user", user_id));
        }

        self.find_user(user_id)
            .await?
            .ok_or(ForumError::not_found("user", user_id))
    }
}

pub(crate) async fn exists(conn: &mut SqliteConnection, user_id: UserId) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM Users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}
