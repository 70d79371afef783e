// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! # Directory Data Models
//!
//! Types for the user directory the authentication core reads from. The
//! directory is owned by the enrollment/registration collaborators; this
//! service only looks records up by subject id.
//!
//! ## Subject Id Type
//!
//! The [`SubjectId`] newtype wraps the stable unique identifier embedded in
//! credentials at issuance (a student number, staff id, or provider subject).
//! It provides type safety and clear semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Subject Id Type
// =============================================================================

/// Stable unique identifier of a directory user.
///
/// Embedded in locally-issued tokens as the `sub` claim; never reused across
/// users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubjectId(pub String);

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        SubjectId(value)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        SubjectId(value.to_string())
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

// =============================================================================
// User Records
// =============================================================================

/// A persisted directory identity.
///
/// The role tag decides which partition the record lives in and is
/// authoritative for authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserRecord {
    /// Stable subject id this record is keyed by.
    pub subject_id: SubjectId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Role tag (student, teacher, or admin).
    pub role: Role,
    /// When the record was enrolled.
    pub created_at: DateTime<Utc>,
}

/// Schema of the optional seed file loaded at startup (`SEED_USERS_FILE`).
#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    /// Records to load into the directory before serving.
    pub users: Vec<UserRecord>,
}
