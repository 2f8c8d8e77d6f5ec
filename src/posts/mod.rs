mod detail;
mod feed;
mod new;
mod replies;
mod vote;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(feed::feed))
        .route("/tags", get(feed::tags))
        .route("/posts", post(new::new_post))
        .route("/posts/{post_id}", get(detail::post_detail))
        .route("/posts/{post_id}/vote", get(vote::vote_state).post(vote::vote))
        .route("/posts/{post_id}/replies", get(replies::replies).post(replies::reply))
}
