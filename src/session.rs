use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::models::UserId;

/// Header carrying the already-authenticated user's numeric id.
pub const USER_ID: &str = "x-user-id";

/// Viewer id used when nobody is signed in. Matches no vote rows.
pub const ANONYMOUS: UserId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

fn read_user_id(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_ID)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        read_user_id(parts)
            .map(ActingUser)
            .ok_or((StatusCode::UNAUTHORIZED, "missing or invalid x-user-id header"))
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for ActingUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(read_user_id(parts).map(ActingUser))
    }
}
