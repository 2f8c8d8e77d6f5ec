mod page;

use axum::{routing::{get, put}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles/me", put(page::update_profile))
        .route("/profiles/{user_id}", get(page::profile))
}
