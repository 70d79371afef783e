// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
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
    auth::{gate, AuthenticatedUser, Destination, Role},
    error::ApiError,
    models::{SubjectId, UserRecord},
    state::AppState,
};

pub mod admin;
pub mod health;
pub mod session;

pub fn router(state: AppState) -> Router {
    // Every /v1 route sits behind the auth gate; health and docs stay
    // public.
    let v1_routes = Router::new()
        .route("/session/me", get(session::current_session))
        .route("/session/destination", get(session::session_destination))
        .route("/admin/users", get(admin::list_users))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::authenticate,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(|| async { ApiError::not_found("Route not found") })
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        session::current_session,
        session::session_destination,
        admin::list_users
    ),
    components(
        schemas(
            AuthenticatedUser,
            Role,
            Destination,
            SubjectId,
            UserRecord,
            session::SessionResponse,
            session::DestinationResponse,
            admin::UserListResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Session", description = "Authenticated session introspection"),
        (name = "Admin", description = "Administrative directory access")
    )
)]
struct ApiDoc;
