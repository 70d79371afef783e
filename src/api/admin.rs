// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Admin endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AdminOnly;
use crate::models::UserRecord;
use crate::state::AppState;

/// Response for GET /v1/admin/users
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// Directory records, students first, then teachers, then admins.
    pub users: Vec<UserRecord>,
    /// Total record count.
    pub total: usize,
}

/// List all directory records. Admin role required.
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Directory listing", body = UserListResponse),
        (status = 401, description = "Unauthorized - invalid or missing credential"),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<UserListResponse> {
    let users = state.directory.list_all().await;
    let total = users.len();
    Json(UserListResponse { users, total })
}
