#![allow(dead_code)]

use sqlx::SqlitePool;
use uniforum::{
    app, db, AppState,
    feed::FeedComposer,
    membership::MembershipManager,
    models::{CommunityId, NewPost, PostId, UserId},
    store::Store,
    votes::VoteEngine,
};

pub struct Forum {
    pub pool: SqlitePool,
    pub store: Store,
    pub votes: VoteEngine,
    pub feed: FeedComposer,
    pub memberships: MembershipManager,
}

/// In-memory database on a single connection, so every query sees the same file.
pub async fn forum() -> Forum {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::init_schema(&pool).await.unwrap();

    let store = Store::new(pool.clone());
    Forum {
        votes: VoteEngine::new(store.clone()),
        feed: FeedComposer::new(store.clone()),
        memberships: MembershipManager::new(store.clone()),
        store,
        pool,
    }
}

impl Forum {
    /// Serves the full router over this forum's pool on a free local port.
    pub async fn serve(&self) -> Api {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let router = app(AppState::new(self.pool.clone()));
        tokio::spawn(async move { axum::serve(listener, router).await });

        Api {
            base,
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
        }
    }

    pub async fn user(&self, name: &str) -> UserId {
        self.store
            .create_user(name, "$2b$12$opaque", &format!("{name}@example.edu"))
            .await
            .unwrap()
    }

    pub async fn community(&self, name: &str) -> CommunityId {
        self.memberships.ensure_community(name).await.unwrap()
    }

    pub async fn join(&self, user_id: UserId, community_ids: &[CommunityId]) {
        self.memberships
            .reconcile_memberships(user_id, &community_ids.iter().copied().collect())
            .await
            .unwrap();
    }

    pub async fn post(
        &self,
        community_id: CommunityId,
        user_id: UserId,
        title: &str,
        content: &str,
        tag: Option<&str>,
    ) -> PostId {
        self.store
            .create_post(&NewPost {
                community_id,
                user_id,
                title: title.to_owned(),
                content: content.to_owned(),
                tag: tag.map(str::to_owned),
            })
            .await
            .unwrap()
    }

    /// Posts created in one test share a second; pin their timestamps.
    pub async fn set_created(&self, post_id: PostId, created_time: Option<&str>) {
        sqlx::query("UPDATE Posts SET created_time = ? WHERE post_id = ?")
            .bind(created_time)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn set_likes(&self, post_id: PostId, likes: i64) {
        sqlx::query("UPDATE Posts SET number_of_likes = ? WHERE post_id = ?")
            .bind(likes)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn likes(&self, post_id: PostId) -> i64 {
        self.store.like_count(post_id).await.unwrap().unwrap()
    }

    pub async fn vote_rows(&self, post_id: PostId) -> i64 {
        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Post_Votes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        rows
    }

    pub async fn vote_sum(&self, post_id: PostId) -> i64 {
        let (sum,): (i64,) = sqlx::query_as("SELECT COALESCE(SUM(vote_type), 0) FROM Post_Votes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        sum
    }
}

pub struct Api {
    base: String,
    client: reqwest::Client,
}

impl Api {
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{path}", self.base))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{path}", self.base))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(format!("{}{path}", self.base))
    }
}
