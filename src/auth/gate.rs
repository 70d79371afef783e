// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Request gate: the authentication middleware.
//!
//! Every request to the protected surface passes through [`authenticate`]:
//! the gate extracts the presented credential, hands it to the first
//! verification scheme that accepts it, and either attaches the resolved
//! [`AuthenticatedUser`] to the request extensions and continues the
//! pipeline, or terminates it with exactly one rejection response.
//!
//! ## Credential sources
//!
//! A JSON body `token` field (external sign-in tokens) takes precedence;
//! the `Authorization: Bearer <token>` header is the fallback. The order is
//! fixed and a scheme that attempts verification decides the outcome — a
//! failed local token is never retried as an external one, nor vice versa.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::claims::AuthenticatedUser;
use super::codec::verify_access_token;
use super::error::AuthError;
use super::external::GoogleVerifier;
use crate::models::SubjectId;
use crate::state::AppState;
use crate::store::UserDirectory;

/// JSON body field external sign-in tokens arrive in.
pub const CREDENTIAL_BODY_FIELD: &str = "token";

/// Upper bound on a request body inspected for a credential.
const CREDENTIAL_BODY_LIMIT: usize = 64 * 1024;

/// Where a credential was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// JSON body `token` field
    Body,
    /// `Authorization: Bearer` header
    Header,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Body => write!(f, "body"),
            CredentialSource::Header => write!(f, "header"),
        }
    }
}

/// An opaque credential lifted off the request. Dropped with the request;
/// never logged.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

/// One way of turning a credential into an authenticated user.
///
/// The gate walks its schemes in order; the first whose `accepts` returns
/// true gets to verify, and its verdict is final.
#[async_trait]
pub trait VerificationScheme: Send + Sync {
    /// Scheme tag for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this scheme handles credentials from this source.
    fn accepts(&self, credential: &Credential) -> bool;

    /// Verify the credential and resolve the identity it attests.
    async fn verify(&self, credential: &Credential) -> Result<AuthenticatedUser, AuthError>;
}

/// Locally-issued access tokens: HS256 verification followed by a directory
/// lookup of the embedded subject.
pub struct LocalTokenScheme {
    secret: String,
    directory: Arc<UserDirectory>,
}

impl LocalTokenScheme {
    pub fn new(secret: impl Into<String>, directory: Arc<UserDirectory>) -> Self {
        Self {
            secret: secret.into(),
            directory,
        }
    }
}

#[async_trait]
impl VerificationScheme for LocalTokenScheme {
    fn name(&self) -> &'static str {
        "local"
    }

    fn accepts(&self, credential: &Credential) -> bool {
        credential.source == CredentialSource::Header
    }

    async fn verify(&self, credential: &Credential) -> Result<AuthenticatedUser, AuthError> {
        let claims = verify_access_token(&credential.token, &self.secret)?;

        let subject_id = SubjectId::from(claims.sub.as_str());
        let record = self
            .directory
            .find_by_id(&subject_id)
            .await
            .ok_or(AuthError::UserNotFound)?;

        debug!(subject = %subject_id, role = %record.role, "access token verified");
        Ok(AuthenticatedUser::from_record(&record, &claims))
    }
}

/// Provider-issued ID tokens: verified against Google, no directory lookup.
/// A first-time external sign-in defers account creation to the enrollment
/// collaborator.
pub struct ExternalTokenScheme {
    verifier: Arc<GoogleVerifier>,
}

impl ExternalTokenScheme {
    pub fn new(verifier: Arc<GoogleVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl VerificationScheme for ExternalTokenScheme {
    fn name(&self) -> &'static str {
        "external"
    }

    fn accepts(&self, credential: &Credential) -> bool {
        credential.source == CredentialSource::Body
    }

    async fn verify(&self, credential: &Credential) -> Result<AuthenticatedUser, AuthError> {
        let payload = self.verifier.verify(&credential.token).await?;
        debug!(subject = %payload.subject_id, "external ID token verified");
        Ok(AuthenticatedUser::from_external(payload))
    }
}

/// The gate itself: an ordered list of verification schemes.
pub struct RequestGate {
    schemes: Vec<Arc<dyn VerificationScheme>>,
}

impl RequestGate {
    /// Standard deployment: external ID tokens (body) first, local access
    /// tokens (header) second.
    pub fn new(
        secret: impl Into<String>,
        verifier: Arc<GoogleVerifier>,
        directory: Arc<UserDirectory>,
    ) -> Self {
        Self {
            schemes: vec![
                Arc::new(ExternalTokenScheme::new(verifier)),
                Arc::new(LocalTokenScheme::new(secret, directory)),
            ],
        }
    }

    /// Gate over an explicit scheme list.
    pub fn with_schemes(schemes: Vec<Arc<dyn VerificationScheme>>) -> Self {
        Self { schemes }
    }

    /// Run the credential through the first scheme that accepts it.
    pub async fn authenticate(
        &self,
        credential: &Credential,
    ) -> Result<AuthenticatedUser, AuthError> {
        for scheme in &self.schemes {
            if scheme.accepts(credential) {
                debug!(scheme = scheme.name(), source = %credential.source, "credential dispatched");
                return scheme.verify(credential).await;
            }
        }
        // Reaching here means the deployment registered no scheme for a
        // source the extractor produces; that is a wiring bug, not a client
        // error.
        Err(AuthError::InternalError(format!(
            "no verification scheme accepts credentials from {}",
            credential.source
        )))
    }
}

/// Authentication middleware.
///
/// Attaches the authenticated user to request extensions on success;
/// responds with the mapped rejection otherwise. Exactly one of the two
/// happens per request.
pub async fn authenticate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (request, credential) = match extract_credential(request).await {
        Ok(pair) => pair,
        Err(e) => return reject(e),
    };

    let Some(credential) = credential else {
        return reject(AuthError::MissingCredential);
    };

    match state.gate.authenticate(&credential).await {
        Ok(user) => {
            let mut request = request;
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => reject(e),
    }
}

fn reject(error: AuthError) -> Response {
    // The failure kind is logged, the credential value never is.
    warn!(kind = error.kind(), "request rejected by auth gate");
    if let AuthError::InternalError(detail) = &error {
        tracing::error!(%detail, "internal auth failure");
    }
    error.into_response()
}

/// Pull the credential off the request, body field first, header second.
///
/// The body is only inspected for JSON requests and is restored afterwards
/// so downstream extractors still see it.
async fn extract_credential(
    request: Request,
) -> Result<(Request, Option<Credential>), AuthError> {
    let (parts, body) = request.into_parts();

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let (body, body_token) = if is_json {
        let bytes = to_bytes(body, CREDENTIAL_BODY_LIMIT)
            .await
            .map_err(|e| AuthError::InternalError(format!("credential body unreadable: {e}")))?;
        let token = serde_json::from_slice::<serde_json::Value>(&bytes)
            .ok()
            .and_then(|v| {
                v.get(CREDENTIAL_BODY_FIELD)
                    .and_then(|t| t.as_str())
                    .map(String::from)
            });
        (Body::from(bytes), token)
    } else {
        (body, None)
    };

    let request = Request::from_parts(parts, body);

    if let Some(token) = body_token {
        return Ok((
            request,
            Some(Credential {
                token,
                source: CredentialSource::Body,
            }),
        ));
    }

    match request.headers().get(AUTHORIZATION) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AuthError::InvalidAuthHeader)?;
            let token = value
                .strip_prefix("Bearer ")
                .ok_or(AuthError::InvalidAuthHeader)?
                .trim();
            if token.is_empty() {
                return Err(AuthError::InvalidAuthHeader);
            }
            let token = token.to_string();
            Ok((
                request,
                Some(Credential {
                    token,
                    source: CredentialSource::Header,
                }),
            ))
        }
        None => Ok((request, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::{AccessClaims, IdentityPayload};
    use crate::auth::Role;
    use crate::models::UserRecord;
    use axum::http::{Method, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Extension, Json, Router};
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use tower::ServiceExt;

    const SECRET: &str = "gate-test-secret";

    fn make_token(sub: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: sub.to_string(),
            iat: now,
            exp: now + exp_offset_secs,
            role: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    /// Stands in for the Google verifier: accepts body tokens equal to
    /// "valid-external" and rejects everything else.
    struct StubExternalScheme;

    #[async_trait]
    impl VerificationScheme for StubExternalScheme {
        fn name(&self) -> &'static str {
            "stub-external"
        }

        fn accepts(&self, credential: &Credential) -> bool {
            credential.source == CredentialSource::Body
        }

        async fn verify(&self, credential: &Credential) -> Result<AuthenticatedUser, AuthError> {
            if credential.token == "valid-external" {
                Ok(AuthenticatedUser::from_external(IdentityPayload {
                    subject_id: "ext-1".to_string(),
                    email: "ext@university.example".to_string(),
                    name: None,
                    expires_at: Utc::now().timestamp() + 600,
                }))
            } else {
                Err(AuthError::InvalidExternalToken)
            }
        }
    }

    async fn test_state() -> AppState {
        let directory = Arc::new(UserDirectory::new());
        directory
            .insert(UserRecord {
                subject_id: "S100".into(),
                name: "Ada Student".to_string(),
                email: "ada@university.example".to_string(),
                role: Role::Student,
                created_at: Utc::now(),
            })
            .await;

        let gate = RequestGate::with_schemes(vec![
            Arc::new(StubExternalScheme),
            Arc::new(LocalTokenScheme::new(SECRET, directory.clone())),
        ]);

        AppState::for_tests(directory, Arc::new(gate))
    }

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> Json<AuthenticatedUser> {
        Json(user)
    }

    async fn app() -> Router {
        let state = test_state().await;
        Router::new()
            .route("/protected", get(whoami).post(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn request_without_credential_is_rejected_401() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("required"));
    }

    #[tokio::test]
    async fn valid_local_token_attaches_directory_role() {
        let token = make_token("S100", 3600);
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["subject_id"], "S100");
        assert_eq!(body["role"], "student");
        assert_eq!(body["external"], false);
    }

    #[tokio::test]
    async fn expired_local_token_is_rejected_403() {
        let token = make_token("S100", -3600);
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("expired"));
    }

    #[tokio::test]
    async fn unknown_subject_is_rejected_as_user_not_found() {
        let token = make_token("S999", 3600);
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("no longer exists"));
    }

    #[tokio::test]
    async fn malformed_authorization_header_is_rejected() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, "Token abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn body_token_authenticates_externally_without_directory_lookup() {
        // "ext-1" has no directory record; the external path must not need
        // one.
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/protected")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"token":"valid-external"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["subject_id"], "ext-1");
        assert_eq!(body["external"], true);
    }

    #[tokio::test]
    async fn body_credential_takes_precedence_over_header() {
        let header_token = make_token("S100", 3600);
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {header_token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"token":"valid-external"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["subject_id"], "ext-1");
    }

    #[tokio::test]
    async fn failed_external_token_is_not_retried_locally() {
        // The body token is bogus; even with a valid header token present
        // the gate must not fall through to the local scheme.
        let header_token = make_token("S100", 3600);
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {header_token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"token":"bogus-external"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("could not be verified"));
    }

    #[tokio::test]
    async fn json_body_without_token_field_falls_back_to_header() {
        let token = make_token("S100", 3600);
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"note":"no credential here"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["subject_id"], "S100");
    }
}
