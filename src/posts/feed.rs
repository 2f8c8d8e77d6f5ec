use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;

use crate::{
    feed::{FeedComposer, FeedFilters, FeedMode, FeedSnapshot, SortOrder},
    session::{ActingUser, ANONYMOUS},
    store::Store,
    AppResult, AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct FeedQuery {
    #[serde(default)]
    mode: FeedMode,
    q: Option<String>,
    community: Option<String>,
    tag: Option<String>,
    sort: Option<SortOrder>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn feed(
    State(composer): State<FeedComposer>,
    user: Option<ActingUser>,
    Query(FeedQuery { mode, q, community, tag, sort }): Query<FeedQuery>,
) -> AppResult<Json<FeedSnapshot>> {
    let filters = FeedFilters {
        keyword: q,
        community,
        tag,
    };

    let snapshot = match user {
        Some(ActingUser(user_id)) => composer.snapshot(mode, user_id, filters, sort).await?,
        // signed-out visitors have no communities, show everything newest first
        None => {
            composer
                .snapshot(FeedMode::Explore, ANONYMOUS, filters, Some(sort.unwrap_or(SortOrder::Latest)))
                .await?
        }
    };

    Ok(Json(snapshot))
}

#[debug_handler(state = AppState)]
pub(crate) async fn tags(State(store): State<Store>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(store.list_tags().await?))
}
