// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Google ID token verification.
//!
//! Verifies provider-issued OIDC ID tokens (RS256) against Google's
//! published keys, with the OAuth client id as the expected audience.
//! Every failure is collapsed to [`AuthError::InvalidExternalToken`] toward
//! the caller so the response never reveals which check failed; the distinct
//! cause goes to the server log.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use tracing::debug;

use super::claims::IdentityPayload;
use super::error::AuthError;
use super::jwks::JwksManager;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Issuer values Google uses across its token endpoints.
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims of a Google-issued ID token.
///
/// `aud`, `iss`, and `exp` are enforced by the `jsonwebtoken` validation;
/// only the identity fields are read out afterwards.
#[derive(Debug, Deserialize)]
struct GoogleClaims {
    /// Stable Google subject id
    sub: String,
    /// Verified email address
    email: String,
    /// Display name
    #[serde(default)]
    name: Option<String>,
    /// Expiration timestamp
    exp: i64,
}

/// Verifier for Google-issued ID tokens.
pub struct GoogleVerifier {
    /// Expected audience (the platform's OAuth client id)
    client_id: String,
    /// Key set for signature verification
    jwks: Arc<JwksManager>,
}

impl GoogleVerifier {
    pub fn new(client_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            jwks: Arc::new(JwksManager::new(jwks_url)),
        }
    }

    /// Key set handle, exposed for the readiness probe.
    pub fn jwks(&self) -> &Arc<JwksManager> {
        &self.jwks
    }

    /// Verify an ID token and return the identity it attests.
    ///
    /// Network failures and timeouts from the key fetch are treated the same
    /// as an invalid token.
    pub async fn verify(&self, id_token: &str) -> Result<IdentityPayload, AuthError> {
        match self.verify_inner(id_token).await {
            Ok(payload) => Ok(payload),
            Err(cause) => {
                debug!(%cause, "external ID token rejected");
                Err(AuthError::InvalidExternalToken)
            }
        }
    }

    /// The actual check; errors here name the root cause and stay
    /// server-side.
    async fn verify_inner(&self, id_token: &str) -> Result<IdentityPayload, String> {
        let header = decode_header(id_token).map_err(|e| format!("invalid token header: {e}"))?;
        let kid = header.kid.ok_or_else(|| "token header has no kid".to_string())?;

        let decoding_key = self
            .jwks
            .get_decoding_key(&kid)
            .await
            .map_err(|e| format!("key lookup failed: {e}"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let token_data = decode::<GoogleClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| format!("token validation failed: {e}"))?;

        let claims = token_data.claims;
        Ok(IdentityPayload {
            subject_id: claims.sub,
            email: claims.email,
            name: claims.name,
            expires_at: claims.exp,
        })
    }
}
