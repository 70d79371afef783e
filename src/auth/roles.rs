// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! User roles and post-authentication routing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access, including the admin dashboard and user listing
/// - `Teacher` - Thesis supervision, own dashboard
/// - `Student` - Own theses and calendar, own dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Supervising teacher
    Teacher,
    /// Enrolled student
    Student,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Admin can do anything
            (Role::Admin, _) => true,
            (Role::Teacher, Role::Teacher) => true,
            (Role::Student, Role::Student) => true,
            // Everything else is denied
            _ => false,
        }
    }

    /// Parse a role from its string tag (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Teacher => write!(f, "teacher"),
            Role::Student => write!(f, "student"),
        }
    }
}

/// Navigation destination decided after authentication.
///
/// Total over every input: an unrecognized or missing role degrades to
/// [`Destination::Login`] instead of erroring, since navigation must never
/// hard-fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    StudentDashboard,
    TeacherDashboard,
    AdminDashboard,
    Login,
}

impl Destination {
    /// Map a role to its dashboard.
    pub fn for_role(role: Role) -> Destination {
        match role {
            Role::Student => Destination::StudentDashboard,
            Role::Teacher => Destination::TeacherDashboard,
            Role::Admin => Destination::AdminDashboard,
        }
    }

    /// Map a raw role tag to a destination, falling back to the login page.
    pub fn route(role: &str) -> Destination {
        Role::from_str(role).map_or(Destination::Login, Destination::for_role)
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::StudentDashboard => write!(f, "student-dashboard"),
            Destination::TeacherDashboard => write!(f, "teacher-dashboard"),
            Destination::AdminDashboard => write!(f, "admin-dashboard"),
            Destination::Login => write!(f, "login"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_all_privileges() {
        assert!(Role::Admin.has_privilege(Role::Admin));
        assert!(Role::Admin.has_privilege(Role::Teacher));
        assert!(Role::Admin.has_privilege(Role::Student));
    }

    #[test]
    fn student_only_has_student_privilege() {
        assert!(!Role::Student.has_privilege(Role::Admin));
        assert!(!Role::Student.has_privilege(Role::Teacher));
        assert!(Role::Student.has_privilege(Role::Student));
    }

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("Teacher"), Some(Role::Teacher));
        assert_eq!(Role::from_str("unknown"), None);
    }

    #[test]
    fn route_is_total() {
        assert_eq!(Destination::route("student"), Destination::StudentDashboard);
        assert_eq!(Destination::route("teacher"), Destination::TeacherDashboard);
        assert_eq!(Destination::route("admin"), Destination::AdminDashboard);
        assert_eq!(Destination::route(""), Destination::Login);
        assert_eq!(Destination::route("bogus"), Destination::Login);
    }

    #[test]
    fn destination_display_matches_dashboard_ids() {
        assert_eq!(
            Destination::StudentDashboard.to_string(),
            "student-dashboard"
        );
        assert_eq!(Destination::Login.to_string(), "login");
    }
}
