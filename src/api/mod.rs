// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    licensing::ClaimOutcome,
    models::{AuthRequest, AuthResponse, ProfileResponse, RegisterRequest, RegisterResponse},
    state::AppState,
    storage::LicenseStatus,
};

pub mod auth;
pub mod health;
pub mod users;

/// Header carrying the per-request correlation id. Generated when absent
/// and echoed on every response.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

pub fn router(state: AppState) -> Router {
    let correlation_id = HeaderName::from_static(CORRELATION_ID_HEADER);

    let v1_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/auth", post(auth::authenticate))
        .route("/me", get(users::get_profile));

    Router::new()
        .route("/", get(health::service_info))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::new(correlation_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let correlation_id = request
                .headers()
                .get(CORRELATION_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                correlation_id = %correlation_id
            )
        }))
        .layer(SetRequestIdLayer::new(correlation_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Adds the bearer token security scheme to the OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /v1/auth"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::authenticate,
        users::get_profile,
        health::service_info,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            AuthRequest,
            AuthResponse,
            ProfileResponse,
            ClaimOutcome,
            LicenseStatus,
            health::ServiceInfo,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Users", description = "Authenticated profile"),
        (name = "Health", description = "Service info and health checks")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use axum::{body::to_bytes, http::StatusCode};
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn liveness_echoes_generated_correlation_id() {
        let ctx = TestContext::new();
        let response = get(router(ctx.state.clone()), "/health/live").await;

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(CORRELATION_ID_HEADER).unwrap();
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn supplied_correlation_id_is_kept() {
        let ctx = TestContext::new();
        let response = router(ctx.state.clone())
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .header(CORRELATION_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(CORRELATION_ID_HEADER).unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn readiness_checks_database() {
        let ctx = TestContext::new();
        let response = get(router(ctx.state.clone()), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["checks"]["database"], "ok");
    }

    #[tokio::test]
    async fn service_info_names_the_service() {
        let ctx = TestContext::new();
        let response = get(router(ctx.state.clone()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], health::SERVICE_NAME);
        assert!(body.get("timeUtc").is_some());
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let ctx = TestContext::new();
        let response = get(router(ctx.state.clone()), "/api-doc/openapi.json").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"].get("/v1/auth").is_some());
        assert!(doc["components"]["securitySchemes"].get("bearer_auth").is_some());
    }
}
