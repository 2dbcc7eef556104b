// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::licensing::load_profile;
use crate::models::ProfileResponse;
use crate::state::AppState;

/// Get the caller's account and license.
///
/// The token only identifies the records; the response reflects the store
/// at request time, so a license revoked after login shows as revoked here.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "User or license no longer exists"),
    )
)]
pub async fn get_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = tokio::task::spawn_blocking(move || load_profile(&state.db, &user)).await??;

    profile
        .map(|profile| Json(profile.into()))
        .ok_or_else(|| ApiError::not_found("User or license not found"))
}
