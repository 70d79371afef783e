// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Token claims and the authenticated request context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;
use crate::models::UserRecord;

/// Claims carried by a locally-issued access token.
///
/// Issued by the login collaborator at sign-in time; this core only decodes
/// and verifies them. Any extra claims embedded at issuance pass through
/// serde untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (directory user ID)
    pub sub: String,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Role tag embedded at issuance.
    ///
    /// Informational only: the directory record is authoritative for
    /// authorization, so this is never trusted for access decisions.
    #[serde(default)]
    pub role: Option<String>,
}

/// Verified identity returned by the external identity provider.
#[derive(Debug, Clone)]
pub struct IdentityPayload {
    /// Stable subject id issued by the provider
    pub subject_id: String,
    /// Verified email address
    pub email: String,
    /// Display name, if the provider shared one
    pub name: Option<String>,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

/// Authenticated user attached to a request by the gate.
///
/// This is the only way identity reaches downstream handlers: the gate
/// populates it exactly once per request, so a handler that can read it is
/// guaranteed the request passed verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
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

    /// Whether this identity was verified by the external provider rather
    /// than a locally-issued token. Externally-authenticated contexts carry
    /// no guaranteed directory record.
    pub external: bool,

    /// Credential expiry (Unix timestamp, used for logging, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build the context for a locally-verified token whose subject was
    /// resolved against the directory. The record's role tag wins over any
    /// role embedded in the token.
    pub fn from_record(record: &UserRecord, claims: &AccessClaims) -> Self {
        Self {
            subject_id: record.subject_id.to_string(),
            role: record.role,
            email: Some(record.email.clone()),
            name: Some(record.name.clone()),
            external: false,
            expires_at: claims.exp,
        }
    }

    /// Build the context for an externally-verified identity.
    ///
    /// No directory lookup happens on this path; a first-time external
    /// sign-in defers account creation to a separate collaborator, so the
    /// role defaults to the least-privileged one.
    pub fn from_external(payload: IdentityPayload) -> Self {
        Self {
            subject_id: payload.subject_id,
            role: Role::Student,
            email: Some(payload.email),
            name: payload.name,
            external: true,
            expires_at: payload.expires_at,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectId;
    use chrono::Utc;

    fn sample_record() -> UserRecord {
        UserRecord {
            subject_id: SubjectId::from("S100"),
            name: "Test Student".to_string(),
            email: "s100@university.example".to_string(),
            role: Role::Student,
            created_at: Utc::now(),
        }
    }

    fn sample_claims() -> AccessClaims {
        AccessClaims {
            sub: "S100".to_string(),
            iat: 1700000000,
            exp: 1700003600,
            role: Some("teacher".to_string()),
        }
    }

    #[test]
    fn from_record_uses_directory_role_over_token_role() {
        // The token claims "teacher" but the directory record says student.
        let user = AuthenticatedUser::from_record(&sample_record(), &sample_claims());
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.subject_id, "S100");
        assert!(!user.external);
        assert_eq!(user.expires_at, 1700003600);
    }

    #[test]
    fn from_external_marks_context_external() {
        let user = AuthenticatedUser::from_external(IdentityPayload {
            subject_id: "google-oauth2|987".to_string(),
            email: "new@university.example".to_string(),
            name: Some("New User".to_string()),
            expires_at: 1700003600,
        });
        assert!(user.external);
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.subject_id, "google-oauth2|987");
    }

    #[test]
    fn has_role_checks_privilege() {
        let mut user = AuthenticatedUser::from_record(&sample_record(), &sample_claims());
        user.role = Role::Admin;

        assert!(user.has_role(Role::Admin));
        assert!(user.has_role(Role::Student));
        assert!(user.is_admin());
    }

    #[test]
    fn access_claims_deserialize_with_optional_role() {
        let json = r#"{"sub":"S1","exp":1735689600}"#;
        let claims: AccessClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "S1");
        assert_eq!(claims.iat, 0);
        assert!(claims.role.is_none());
    }
}
