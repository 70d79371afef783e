// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ThesisDesk

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment exactly once at startup and
//! carried in an explicit [`Settings`] struct; nothing reads the environment
//! after boot. Missing required values abort startup with a clear message
//! instead of silently disabling verification.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_SECRET` | HS256 signing secret for local access tokens | Required |
//! | `GOOGLE_CLIENT_ID` | Expected audience of Google ID tokens | Required |
//! | `GOOGLE_JWKS_URL` | Google certs endpoint | `https://www.googleapis.com/oauth2/v3/certs` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_USERS_FILE` | JSON file of directory records to load at boot | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Environment variable name for the local token signing secret.
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";

/// Environment variable name for the Google OAuth client id.
pub const GOOGLE_CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";

/// Environment variable name for the Google JWKS endpoint.
pub const GOOGLE_JWKS_URL_ENV: &str = "GOOGLE_JWKS_URL";

/// Environment variable name for the bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the optional directory seed file.
pub const SEED_USERS_FILE_ENV: &str = "SEED_USERS_FILE";

/// Environment variable name for the log format selector.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Google's published certs endpoint.
pub const DEFAULT_GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Configuration errors surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Process-wide settings, immutable after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HS256 secret shared with the token-issuing collaborator. Never
    /// logged.
    pub auth_secret: String,
    /// Expected audience of Google ID tokens.
    pub google_client_id: String,
    /// Google certs endpoint (HTTPS only).
    pub google_jwks_url: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Optional directory seed file.
    pub seed_users_file: Option<PathBuf>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an injected lookup, so tests never touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let auth_secret = lookup(AUTH_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar(AUTH_SECRET_ENV))?;

        let google_client_id = lookup(GOOGLE_CLIENT_ID_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar(GOOGLE_CLIENT_ID_ENV))?;

        let google_jwks_url =
            lookup(GOOGLE_JWKS_URL_ENV).unwrap_or_else(|| DEFAULT_GOOGLE_JWKS_URL.to_string());
        let parsed = Url::parse(&google_jwks_url).map_err(|e| ConfigError::InvalidVar {
            name: GOOGLE_JWKS_URL_ENV,
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "https" {
            return Err(ConfigError::InvalidVar {
                name: GOOGLE_JWKS_URL_ENV,
                reason: "JWKS endpoint must be HTTPS".to_string(),
            });
        }

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: PORT_ENV,
                reason: format!("not a port number: {raw}"),
            })?,
            None => DEFAULT_PORT,
        };

        let seed_users_file = lookup(SEED_USERS_FILE_ENV).map(PathBuf::from);

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            auth_secret,
            google_client_id,
            google_jwks_url,
            host,
            port,
            seed_users_file,
            log_format,
        })
    }
}
