use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;

use crate::{
    error::ForumError,
    models::{ProfileUpdate, User, UserId},
    session::ActingUser,
    store::Store,
    AppResult, AppState,
};

/// What `GET /profiles/{id}` shows. The e-mail is only included for the
/// profile's owner.
#[derive(Debug, Serialize)]
pub(crate) struct Profile {
    user_id: UserId,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    linkedin_url: Option<String>,
    github_url: Option<String>,
    department: Option<String>,
}

impl Profile {
    fn shown_to(user: User, viewer: Option<UserId>) -> Self {
        let email = (viewer == Some(user.user_id)).then_some(user.email);
        Self {
            user_id: user.user_id,
            username: user.username,
            email,
            linkedin_url: user.linkedin_url,
            github_url: user.github_url,
            department: user.department,
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(store): State<Store>,
    viewer: Option<ActingUser>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Profile>> {
    let Some(user) = store.find_user(user_id).await? else {
        return Err(ForumError::not_found("user", user_id).into());
    };

    Ok(Json(Profile::shown_to(user, viewer.map(|ActingUser(id)| id))))
}

/// Only ever edits the acting user's own profile.
#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(store): State<Store>,
    ActingUser(user_id): ActingUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    Ok(Json(store.update_profile(user_id, &update).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User {
            user_id: 3,
            username: "ada".to_owned(),
            password_hash: "!".to_owned(),
            email: "ada@example.edu".to_owned(),
            linkedin_url: None,
            github_url: Some("https://github.com/ada".to_owned()),
            department: None,
        }
    }

    #[test]
    fn email_is_for_the_owner_only() {
        let own = serde_json::to_value(Profile::shown_to(ada(), Some(3))).unwrap();
        assert_eq!(own["email"], "ada@example.edu");

        for viewer in [None, Some(4)] {
            let public = serde_json::to_value(Profile::shown_to(ada(), viewer)).unwrap();
            assert!(public.get("email").is_none());
            assert!(public.get("password_hash").is_none());
            assert_eq!(public["username"], "ada");
        }
    }
}
