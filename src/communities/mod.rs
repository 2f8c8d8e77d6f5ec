mod memberships;

use axum::{debug_handler, extract::State, routing::get, Json, Router};

use crate::{models::Community, store::Store, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communities", get(communities))
        .route(
            "/memberships",
            get(memberships::memberships).put(memberships::reconcile),
        )
}

#[debug_handler(state = AppState)]
async fn communities(State(store): State<Store>) -> AppResult<Json<Vec<Community>>> {
    Ok(Json(store.list_communities().await?))
}
