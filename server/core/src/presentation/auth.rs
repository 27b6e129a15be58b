// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Identity Boundary
//!
//! Resolves the caller's user id before any handler body runs. Credential
//! checking is an external collaborator: the demo resolver trusts the
//! `x-user-id` header or the `userId` query parameter. Swapping in a real
//! session/authentication layer means replacing this extractor only;
//! handlers never parse identity themselves.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::user::UserId;
use crate::presentation::api::ApiError;

/// The verified user id of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(header) = parts.headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
            let header = header.trim();
            if !header.is_empty() {
                return Ok(CurrentUser(UserId::new(header)));
            }
        }

        if let Some(query) = parts.uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                if key == "userId" && !value.trim().is_empty() {
                    return Ok(CurrentUser(UserId::new(value.trim())));
                }
            }
        }

        Err(ApiError::Validation("User ID required".to_string()))
    }
}
