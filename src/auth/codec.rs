// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Locally-issued access token verification.
//!
//! Tokens are HMAC-SHA256 signed JWTs carrying an [`AccessClaims`] payload,
//! minted by the login collaborator with the shared `AUTH_SECRET`. This
//! module only verifies; issuance lives outside this service.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::claims::AccessClaims;
use super::error::AuthError;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verify a locally-issued access token against the signing secret.
///
/// Failure taxonomy, in evaluation order:
/// - [`AuthError::MalformedToken`] when the token cannot be parsed at all
/// - [`AuthError::TokenExpired`] when the claimed expiry is in the past,
///   regardless of whether the signature would have checked out
/// - [`AuthError::InvalidSignature`] when the signature does not match
///
/// Deterministic given (token, secret, current time); no side effects.
pub fn verify_access_token(token: &str, secret: &str) -> Result<AccessClaims, AuthError> {
    // Expiry is checked before the signature so an expired token always
    // reports as expired. The insecurely-decoded claims are used for that
    // check only and thrown away.
    let unverified = jsonwebtoken::dangerous::insecure_decode::<AccessClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;

    let now = chrono::Utc::now().timestamp();
    if unverified.claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    // Local tokens carry no audience claim.
    validation.validate_aud = false;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    })?;

    Ok(token_data.claims)
}
