// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

use std::{net::SocketAddr, sync::Arc};

use tracing::info;
use tracing_subscriber::EnvFilter;

use thesisdesk_server::api::router;
use thesisdesk_server::auth::{GoogleVerifier, RequestGate};
use thesisdesk_server::config::{LogFormat, Settings};
use thesisdesk_server::models::SeedFile;
use thesisdesk_server::state::AppState;
use thesisdesk_server::store::UserDirectory;

#[tokio::main]
async fn main() {
    // Verification must never be silently disabled: missing secrets abort
    // startup here.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Fatal configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(settings.log_format);

    let directory = Arc::new(UserDirectory::new());
    if let Some(path) = &settings.seed_users_file {
        let raw = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read seed file {}: {e}", path.display()));
        let seed: SeedFile = serde_json::from_str(&raw)
            .unwrap_or_else(|e| panic!("Failed to parse seed file {}: {e}", path.display()));
        for record in seed.users {
            directory.insert(record).await;
        }
        info!(count = directory.len().await, "seeded user directory");
    }

    let verifier = Arc::new(GoogleVerifier::new(
        settings.google_client_id.clone(),
        settings.google_jwks_url.clone(),
    ));
    let jwks = verifier.jwks().clone();
    let gate = Arc::new(RequestGate::new(
        settings.auth_secret.clone(),
        verifier,
        directory.clone(),
    ));

    let state = AppState::new(directory, gate, Some(jwks));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .expect("Failed to parse bind address");

    info!("ThesisDesk auth server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    info!("shutdown signal received");
}
