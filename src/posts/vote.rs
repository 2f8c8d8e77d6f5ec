use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;

use crate::{
    models::{PostId, VoteDirection, VoteOutcome, VoteState},
    session::ActingUser,
    votes::VoteEngine,
    AppResult, AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct VoteBody {
    direction: VoteDirection,
}

#[debug_handler(state = AppState)]
pub(crate) async fn vote(
    State(engine): State<VoteEngine>,
    ActingUser(user_id): ActingUser,
    Path(post_id): Path<PostId>,
    Json(VoteBody { direction }): Json<VoteBody>,
) -> AppResult<Json<VoteOutcome>> {
    Ok(Json(engine.apply_vote(post_id, user_id, direction).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn vote_state(
    State(engine): State<VoteEngine>,
    ActingUser(user_id): ActingUser,
    Path(post_id): Path<PostId>,
) -> AppResult<Json<VoteState>> {
    Ok(Json(engine.vote_state(post_id, user_id).await?))
}
