pub mod appresult;
pub mod communities;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod markdown;
pub mod membership;
pub mod models;
pub mod posts;
pub mod profiles;
pub mod session;
pub mod store;
pub mod timeago;
pub mod votes;

use axum::{extract::FromRef, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};

use feed::FeedComposer;
use membership::MembershipManager;
use store::Store;
use votes::VoteEngine;

/// One store handle shared by every component.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub votes: VoteEngine,
    pub feed: FeedComposer,
    pub memberships: MembershipManager,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        let store = Store::new(db_pool);
        Self {
            votes: VoteEngine::new(store.clone()),
            feed: FeedComposer::new(store.clone()),
            memberships: MembershipManager::new(store.clone()),
            store,
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    Router::new()
        .merge(posts::router())
        .merge(communities::router())
        .merge(profiles::router())
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
