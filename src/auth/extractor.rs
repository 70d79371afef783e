// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers on the gated surface:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The extractors read the context the gate middleware attached; they never
//! verify credentials themselves, so a handler reachable through them is
//! guaranteed to sit behind the gate.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser, Role};

/// Extractor for the authenticated user.
///
/// Fails with 401 when no context is attached, which only happens when a
/// route was mounted outside the gate layer.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingCredential)
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn sample_user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            subject_id: "S100".to_string(),
            role,
            email: None,
            name: None,
            external: false,
            expires_at: 0,
        }
    }

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    #[tokio::test]
    async fn auth_reads_gate_attached_context() {
        let mut parts = parts_with(Some(sample_user(Role::Teacher)));
        let Auth(user) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.subject_id, "S100");
        assert_eq!(user.role, Role::Teacher);
    }

    #[tokio::test]
    async fn auth_rejects_when_no_context_attached() {
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(sample_user(Role::Student)));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let mut parts = parts_with(Some(sample_user(Role::Admin)));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }
}
