use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    models::{PostId, ReplySummary},
    session::ActingUser,
    store::Store,
    AppResult, AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewReply {
    content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn replies(
    State(store): State<Store>,
    Path(post_id): Path<PostId>,
) -> AppResult<Json<Vec<ReplySummary>>> {
    Ok(Json(store.list_replies(post_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reply(
    State(store): State<Store>,
    ActingUser(user_id): ActingUser,
    Path(post_id): Path<PostId>,
    Json(NewReply { content }): Json<NewReply>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let reply_id = store.create_reply(post_id, user_id, &content).await?;

    Ok((StatusCode::CREATED, Json(json!({ "reply_id": reply_id }))))
}
