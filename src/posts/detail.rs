use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;

use crate::{
    error::ForumError,
    markdown,
    models::{PostId, PostSummary, ReplySummary},
    session::{ActingUser, ANONYMOUS},
    store::Store,
    AppResult, AppState,
};

#[derive(Debug, Serialize)]
pub(crate) struct ReplyView {
    #[serde(flatten)]
    reply: ReplySummary,
    content_html: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostDetail {
    #[serde(flatten)]
    post: PostSummary,
    content_html: String,
    /// The replies themselves; `replies` is already the flattened count.
    thread: Vec<ReplyView>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn post_detail(
    State(store): State<Store>,
    user: Option<ActingUser>,
    Path(post_id): Path<PostId>,
) -> AppResult<Json<PostDetail>> {
    let viewer = user.map_or(ANONYMOUS, |ActingUser(user_id)| user_id);

    let Some(post) = store.get_post(post_id, viewer).await? else {
        return Err(ForumError::not_found("post", post_id).into());
    };

    let thread = store
        .list_replies(post_id)
        .await?
        .into_iter()
        .map(|reply| ReplyView {
            content_html: markdown::render(&reply.content),
            reply,
        })
        .collect();

    Ok(Json(PostDetail {
        content_html: markdown::render(&post.content),
        post,
        thread,
    }))
}
