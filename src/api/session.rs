// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Session endpoints for authenticated clients.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, AuthenticatedUser, Destination, Role};

/// Response for GET /v1/session/me
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Canonical subject id
    pub subject_id: String,
    /// User's role
    pub role: Role,
    /// Email, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the identity was verified by the external provider
    pub external: bool,
}

impl From<AuthenticatedUser> for SessionResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            subject_id: user.subject_id,
            role: user.role,
            email: user.email,
            name: user.name,
            external: user.external,
        }
    }
}

/// Response for GET /v1/session/destination
#[derive(Debug, Serialize, ToSchema)]
pub struct DestinationResponse {
    /// User's role
    pub role: Role,
    /// Dashboard the client should navigate to
    pub destination: Destination,
}

/// Get the current authenticated session.
#[utoipa::path(
    get,
    path = "/v1/session/me",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Unauthorized - invalid or missing credential"),
    )
)]
pub async fn current_session(Auth(user): Auth) -> Json<SessionResponse> {
    Json(user.into())
}

/// Get the dashboard destination for the current session's role.
#[utoipa::path(
    get,
    path = "/v1/session/destination",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Navigation destination", body = DestinationResponse),
        (status = 401, description = "Unauthorized - invalid or missing credential"),
    )
)]
pub async fn session_destination(Auth(user): Auth) -> Json<DestinationResponse> {
    Json(DestinationResponse {
        role: user.role,
        destination: Destination::for_role(user.role),
    })
}
