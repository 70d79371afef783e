// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! Role-partitioned in-memory user directory.
//!
//! The directory mirrors how enrollment keeps students, teachers, and admins
//! in separate collections. The authentication core only reads it; writes
//! happen at startup (seed file) and from enrollment collaborators outside
//! this crate.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::auth::Role;
use crate::models::{SubjectId, UserRecord};

/// Partitioned user store.
///
/// Lookup scans partitions in a fixed order: student, then teacher, then
/// admin. A subject id present in more than one partition is a
/// data-integrity bug in issuance; the scan order makes its resolution
/// deterministic rather than correct.
#[derive(Default)]
pub struct UserDirectory {
    partitions: RwLock<Partitions>,
}

#[derive(Default)]
struct Partitions {
    students: HashMap<SubjectId, UserRecord>,
    teachers: HashMap<SubjectId, UserRecord>,
    admins: HashMap<SubjectId, UserRecord>,
}

impl Partitions {
    fn partition_mut(&mut self, role: Role) -> &mut HashMap<SubjectId, UserRecord> {
        match role {
            Role::Student => &mut self.students,
            Role::Teacher => &mut self.teachers,
            Role::Admin => &mut self.admins,
        }
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into the partition named by its role tag.
    pub async fn insert(&self, record: UserRecord) {
        let mut partitions = self.partitions.write().await;
        partitions
            .partition_mut(record.role)
            .insert(record.subject_id.clone(), record);
    }

    /// Look a subject up across all partitions (student, teacher, admin
    /// order). Returns `None` when the subject is unknown.
    pub async fn find_by_id(&self, subject_id: &SubjectId) -> Option<UserRecord> {
        let partitions = self.partitions.read().await;
        partitions
            .students
            .get(subject_id)
            .or_else(|| partitions.teachers.get(subject_id))
            .or_else(|| partitions.admins.get(subject_id))
            .cloned()
    }

    /// All records across partitions, students first, then teachers, then
    /// admins, sorted by subject id within each partition.
    pub async fn list_all(&self) -> Vec<UserRecord> {
        let partitions = self.partitions.read().await;
        let mut all = Vec::with_capacity(
            partitions.students.len() + partitions.teachers.len() + partitions.admins.len(),
        );
        for partition in [&partitions.students, &partitions.teachers, &partitions.admins] {
            let mut records: Vec<_> = partition.values().cloned().collect();
            records.sort_by(|a, b| a.subject_id.cmp(&b.subject_id));
            all.extend(records);
        }
        all
    }

    /// Total number of records.
    pub async fn len(&self) -> usize {
        let partitions = self.partitions.read().await;
        partitions.students.len() + partitions.teachers.len() + partitions.admins.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(subject_id: &str, role: Role) -> UserRecord {
        UserRecord {
            subject_id: SubjectId::from(subject_id),
            name: format!("User {subject_id}"),
            email: format!("{subject_id}@university.example"),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn find_by_id_spans_partitions() {
        let directory = UserDirectory::new();
        directory.insert(record("S100", Role::Student)).await;
        directory.insert(record("T200", Role::Teacher)).await;
        directory.insert(record("A300", Role::Admin)).await;

        let student = directory.find_by_id(&SubjectId::from("S100")).await.unwrap();
        assert_eq!(student.role, Role::Student);
        let teacher = directory.find_by_id(&SubjectId::from("T200")).await.unwrap();
        assert_eq!(teacher.role, Role::Teacher);
        let admin = directory.find_by_id(&SubjectId::from("A300")).await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_subject() {
        let directory = UserDirectory::new();
        directory.insert(record("S100", Role::Student)).await;

        assert!(directory.find_by_id(&SubjectId::from("S999")).await.is_none());
    }

    #[tokio::test]
    async fn duplicate_subject_resolves_to_student_partition_first() {
        // Issuance should never produce this; the lookup order still has to
        // be deterministic when it does.
        let directory = UserDirectory::new();
        directory.insert(record("X1", Role::Admin)).await;
        directory.insert(record("X1", Role::Student)).await;

        let found = directory.find_by_id(&SubjectId::from("X1")).await.unwrap();
        assert_eq!(found.role, Role::Student);
    }

    #[tokio::test]
    async fn list_all_orders_partitions_then_ids() {
        let directory = UserDirectory::new();
        directory.insert(record("T2", Role::Teacher)).await;
        directory.insert(record("S2", Role::Student)).await;
        directory.insert(record("S1", Role::Student)).await;

        let all = directory.list_all().await;
        let ids: Vec<_> = all.iter().map(|r| r.subject_id.to_string()).collect();
        assert_eq!(ids, vec!["S1", "S2", "T2"]);
        assert_eq!(directory.len().await, 3);
    }
}
