// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

use std::sync::Arc;

use crate::auth::{JwksManager, RequestGate};
use crate::store::UserDirectory;

/// Shared application state.
///
/// Everything here is immutable configuration or an `Arc` handle; per-request
/// mutation happens only in request extensions.
#[derive(Clone)]
pub struct AppState {
    /// Role-partitioned user directory.
    pub directory: Arc<UserDirectory>,
    /// The authentication gate for the protected surface.
    pub gate: Arc<RequestGate>,
    /// Provider key set handle, probed by the readiness endpoint.
    pub jwks: Option<Arc<JwksManager>>,
}

impl AppState {
    pub fn new(
        directory: Arc<UserDirectory>,
        gate: Arc<RequestGate>,
        jwks: Option<Arc<JwksManager>>,
    ) -> Self {
        Self {
            directory,
            gate,
            jwks,
        }
    }

    /// State without a provider key set, for tests that stub the external
    /// scheme.
    #[cfg(test)]
    pub fn for_tests(directory: Arc<UserDirectory>, gate: Arc<RequestGate>) -> Self {
        Self::new(directory, gate, None)
    }
}
