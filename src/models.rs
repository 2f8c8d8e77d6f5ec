use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type UserId = i64;
pub type CommunityId = i64;
pub type PostId = i64;
pub type ReplyId = i64;

/// A cast vote. Stored in `Post_Votes.vote_type` as `1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(VoteDirection::Up),
            -1 => Some(VoteDirection::Down),
            _ => None,
        }
    }
}

/// What a user currently has on a post. `None` means no `Post_Votes` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    #[default]
    None,
    Up,
    Down,
}

impl VoteState {
    pub fn direction(self) -> Option<VoteDirection> {
        match self {
            VoteState::None => None,
            VoteState::Up => Some(VoteDirection::Up),
            VoteState::Down => Some(VoteDirection::Down),
        }
    }

    /// Unknown stored values read as no vote.
    pub fn from_stored(value: Option<i64>) -> Self {
        value.and_then(VoteDirection::from_value).into()
    }
}

impl From<Option<VoteDirection>> for VoteState {
    fn from(direction: Option<VoteDirection>) -> Self {
        match direction {
            None => VoteState::None,
            Some(VoteDirection::Up) => VoteState::Up,
            Some(VoteDirection::Down) => VoteState::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    /// `false` when the call removed a vote, or touched nothing.
    pub applied: bool,
    pub new_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub email: String,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub department: Option<String>,
}

/// Settings change. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Community {
    pub community_id: CommunityId,
    pub name: String,
    pub moderator_id: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub community_id: CommunityId,
    #[serde(skip)]
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
}

/// A post as the feed renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub post_id: PostId,
    pub community: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
    pub likes: i64,
    pub replies: i64,
    pub created_time: Option<String>,
    pub time_ago: String,
    pub my_vote: VoteState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplySummary {
    pub reply_id: ReplyId,
    pub post_id: PostId,
    pub author: String,
    pub content: String,
    pub likes: i64,
    pub created_time: Option<String>,
    pub time_ago: String,
}
