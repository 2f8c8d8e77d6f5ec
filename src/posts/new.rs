use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{models::NewPost, session::ActingUser, store::Store, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn new_post(
    State(store): State<Store>,
    ActingUser(user_id): ActingUser,
    Json(mut post): Json<NewPost>,
) -> AppResult<(StatusCode, Json<Value>)> {
    post.user_id = user_id;
    let post_id = store.create_post(&post).await?;

    Ok((StatusCode::CREATED, Json(json!({ "post_id": post_id }))))
}
