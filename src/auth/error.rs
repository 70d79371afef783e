// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication failure taxonomy.
///
/// Expected failures map to 401/403 with a human-readable message and are
/// never retried. `InternalError` carries full detail for the server log but
/// surfaces to the caller as a generic 500.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Neither a body credential nor an authorization header was presented
    #[error("Authentication credential is required")]
    MissingCredential,
    /// Authorization header present but not in `Bearer <token>` form
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Local token could not be parsed at all
    #[error("Token is malformed")]
    MalformedToken,
    /// Local token signature does not match the signing secret
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Local token expiry is in the past
    #[error("Token expired, please sign in again")]
    TokenExpired,
    /// External identity token rejected; root cause is logged, not surfaced
    #[error("Sign-in token could not be verified")]
    InvalidExternalToken,
    /// Credential verified but the subject no longer exists in the directory
    #[error("User account no longer exists")]
    UserNotFound,
    /// Authenticated but lacking the required role
    #[error("Insufficient permissions for this operation")]
    InsufficientPermissions,
    /// Unexpected failure in the store, codec, or verifier
    #[error("Internal authentication error")]
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: String,
}

impl AuthError {
    /// Short stable tag for diagnostic logging.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidExternalToken => "invalid_external_token",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    ///
    /// Expired and bad-signature local tokens answer 403 so a client can
    /// distinguish "re-authenticate" from "credential rejected"; every
    /// external-path failure collapses to a single 401.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidExternalToken
            | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // The Display impl never includes internal detail; InternalError's
        // payload is for the server log only.
        let body = Json(AuthErrorBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
