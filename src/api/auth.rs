// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and authentication endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::licensing::{AuthDecision, Authenticator, RegisterOutcome, Registrar};
use crate::models::{AuthRequest, AuthResponse, RegisterRequest, RegisterResponse};
use crate::state::AppState;

/// Create an account, optionally claiming a license key.
///
/// The account is created even when the claim fails; `claimOutcome`
/// reports what happened to the key.
#[utoipa::path(
    post,
    path = "/v1/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already exists"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let outcome = tokio::task::spawn_blocking(move || {
        Registrar::new(&state.db, &state.passwords).register(
            &request.username,
            &request.password,
            request.license_key.as_deref(),
            Utc::now(),
        )
    })
    .await??;

    match outcome {
        RegisterOutcome::Created { user, claim } => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                created: true,
                username: user.username,
                claim_outcome: claim,
            }),
        )),
        RegisterOutcome::DuplicateUsername => Err(ApiError::conflict("Username already exists")),
        RegisterOutcome::Invalid(reason) => Err(ApiError::bad_request(reason.to_string())),
    }
}

/// Exchange username, password and license key for a bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth",
    tag = "Auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Username, password or key missing"),
        (status = 401, description = "Invalid username or password"),
        (status = 403, description = "License not owned, inactive, or expired"),
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    if request.username.trim().is_empty()
        || request.password.trim().is_empty()
        || request.key.trim().is_empty()
    {
        return Err(AuthError::InvalidRequest(
            "Username, password and key are required".to_string(),
        ));
    }

    let username = request.username.clone();
    let worker = state.clone();
    let decision = tokio::task::spawn_blocking(move || {
        Authenticator::new(&worker.db, &worker.passwords).authorize(
            &request.username,
            &request.password,
            &request.key,
            Utc::now(),
        )
    })
    .await
    .map_err(|e| AuthError::InternalError(e.to_string()))?
    .map_err(|e| AuthError::InternalError(e.to_string()))?;

    let grant = match decision {
        AuthDecision::Granted(grant) => grant,
        AuthDecision::InvalidCredentials => {
            tracing::info!(username = %username, "Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }
        AuthDecision::LicenseInvalid => {
            tracing::info!(username = %username, "Login rejected: license invalid");
            return Err(AuthError::LicenseInvalid);
        }
    };

    let issued = state
        .tokens
        .issue(&grant.username, &grant.level, &grant.license_key, Utc::now())?;

    tracing::info!(
        username = %grant.username,
        license_key = %grant.license_key,
        expires_at = %issued.expires_at,
        "Token issued"
    );

    Ok(Json(AuthResponse::new(grant, issued)))
}
