// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! # Authentication Module
//!
//! Credential verification and request gating for the ThesisDesk API.
//!
//! ## Auth Flow
//!
//! 1. The web client signs in, either against the platform's own login
//!    (which mints an HS256 access token) or with Google
//! 2. The client presents the credential on every request: local tokens as
//!    `Authorization: Bearer <token>`, Google ID tokens in the JSON body
//!    `token` field
//! 3. The gate middleware:
//!    - extracts the credential (body field first, header fallback)
//!    - verifies it with the matching scheme (Google JWKS for ID tokens,
//!      the shared secret for local tokens)
//!    - resolves local subjects against the role-partitioned directory
//!    - attaches the [`AuthenticatedUser`] context, or rejects with a
//!      specific failure reason
//!
//! ## Security
//!
//! - All `/v1` endpoints require authentication
//! - ID token verification uses HTTPS-only JWKS fetching with TTL caching
//! - External-path failures collapse to one generic rejection; the root
//!   cause is only logged server-side
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod codec;
pub mod error;
pub mod external;
pub mod extractor;
pub mod gate;
pub mod jwks;
pub mod roles;

pub use claims::{AccessClaims, AuthenticatedUser, IdentityPayload};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use external::GoogleVerifier;
pub use gate::{Credential, CredentialSource, RequestGate, VerificationScheme};
pub use jwks::JwksManager;
pub use roles::{Destination, Role};
