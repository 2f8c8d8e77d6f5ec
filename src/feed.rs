//! Home and Explore feeds, with the keyword search overlay.
//!
//! Home is the user's joined communities, newest first. Explore is every post,
//! narrowed by the community/tag filters and ordered by the sort selector.
//! Feeds are loaded fresh on every call; a [`FeedSnapshot`] is only what the
//! caller last saw and must be reloaded after a vote, post or reply.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::Result,
    models::{PostSummary, UserId},
    store::{Chronology, Store},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    #[default]
    Home,
    Explore,
}

/// Explore sort selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    MostLiked,
    LeastLiked,
    Latest,
    Oldest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilters {
    /// Case-insensitive substring of the title or body. Applies in both modes.
    pub keyword: Option<String>,
    /// Exact community name. Explore only.
    pub community: Option<String>,
    /// Exact tag. Explore only; untagged posts never match.
    pub tag: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl FeedFilters {
    /// The trimmed, lower-cased search term, if any.
    pub fn search_term(&self) -> Option<String> {
        non_blank(&self.keyword).map(|keyword| keyword.trim().to_lowercase())
    }

    pub fn matches_search(post: &PostSummary, term: &str) -> bool {
        post.title.to_lowercase().contains(term) || post.content.to_lowercase().contains(term)
    }

    fn retain_search(&self, posts: &mut Vec<PostSummary>) {
        if let Some(term) = self.search_term() {
            posts.retain(|post| Self::matches_search(post, &term));
        }
    }

    fn retain_explore(&self, posts: &mut Vec<PostSummary>) {
        self.retain_search(posts);

        if let Some(community) = non_blank(&self.community) {
            posts.retain(|post| post.community == community);
        }
        if let Some(tag) = non_blank(&self.tag) {
            posts.retain(|post| post.tag.as_deref() == Some(tag));
        }
    }
}

/// Stable, so equal counts keep the order they were loaded in.
fn sort_by_likes(posts: &mut [PostSummary], most_first: bool) {
    if most_first {
        posts.sort_by(|a, b| b.likes.cmp(&a.likes));
    } else {
        posts.sort_by(|a, b| a.likes.cmp(&b.likes));
    }
}

#[derive(Clone, Debug)]
pub struct FeedComposer {
    store: Store,
}

impl FeedComposer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn compose_feed(
        &self,
        mode: FeedMode,
        user_id: UserId,
        filters: &FeedFilters,
        sort: Option<SortOrder>,
    ) -> Result<Vec<PostSummary>> {
        let posts = match mode {
            FeedMode::Home => {
                let mut posts = self.store.home_posts(user_id).await?;
                filters.retain_search(&mut posts);
                if filters.search_term().is_some() {
                    sort_by_likes(&mut posts, true);
                }
                posts
            }
            FeedMode::Explore => {
                let sort = sort.unwrap_or_default();
                let mut posts = match sort {
                    SortOrder::MostLiked | SortOrder::LeastLiked => self.store.posts_by_likes(user_id).await?,
                    // the likes-ordered set has lost creation order, so refetch
                    SortOrder::Latest => self.store.posts_by_time(user_id, Chronology::NewestFirst).await?,
                    SortOrder::Oldest => self.store.posts_by_time(user_id, Chronology::OldestFirst).await?,
                };
                filters.retain_explore(&mut posts);
                match sort {
                    SortOrder::MostLiked => sort_by_likes(&mut posts, true),
                    SortOrder::LeastLiked => sort_by_likes(&mut posts, false),
                    SortOrder::Latest | SortOrder::Oldest => {}
                }
                posts
            }
        };

        info!("{mode:?} feed for user {user_id}: {} posts", posts.len());
        Ok(posts)
    }

    pub async fn snapshot(
        &self,
        mode: FeedMode,
        user_id: UserId,
        filters: FeedFilters,
        sort: Option<SortOrder>,
    ) -> Result<FeedSnapshot> {
        let posts = self.compose_feed(mode, user_id, &filters, sort).await?;
        Ok(FeedSnapshot {
            user_id,
            mode,
            filters,
            sort,
            posts,
        })
    }
}

/// The last feed handed to a caller, with the query that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub user_id: UserId,
    pub mode: FeedMode,
    pub filters: FeedFilters,
    pub sort: Option<SortOrder>,
    pub posts: Vec<PostSummary>,
}

impl FeedSnapshot {
    /// Discards the held posts and reruns the same query.
    pub async fn reload(self, composer: &FeedComposer) -> Result<Self> {
        composer.snapshot(self.mode, self.user_id, self.filters, self.sort).await
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
