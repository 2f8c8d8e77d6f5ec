use std::collections::BTreeSet;

use axum::{debug_handler, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::ForumError,
    membership::{MembershipDiff, MembershipManager},
    models::CommunityId,
    session::ActingUser,
    AppResult, AppState,
};

#[derive(Debug, Serialize)]
pub(crate) struct Memberships {
    community_ids: BTreeSet<CommunityId>,
    /// `false` sends the user to course selection.
    joined_any: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DesiredMemberships {
    community_ids: Option<BTreeSet<CommunityId>>,
    community_names: Option<Vec<String>>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn memberships(
    State(manager): State<MembershipManager>,
    ActingUser(user_id): ActingUser,
) -> AppResult<Json<Memberships>> {
    Ok(Json(Memberships {
        community_ids: manager.get_membership(user_id).await?,
        joined_any: manager.has_joined_any(user_id).await?,
    }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reconcile(
    State(manager): State<MembershipManager>,
    ActingUser(user_id): ActingUser,
    Json(desired): Json<DesiredMemberships>,
) -> AppResult<Json<MembershipDiff>> {
    let diff = match desired {
        DesiredMemberships { community_ids: Some(ids), community_names: None } => {
            manager.reconcile_memberships(user_id, &ids).await?
        }
        DesiredMemberships { community_ids: None, community_names: Some(names) } => {
            manager.reconcile_memberships_by_name(user_id, &names).await?
        }
        _ => {
            return Err(ForumError::validation("send exactly one of community_ids or community_names").into());
        }
    };

    Ok(Json(diff))
}
