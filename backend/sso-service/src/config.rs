//! Configuration management for SSO Service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)
//!
//! # Example
//!
//! ```no_run
//! use sso_service::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     println!("gRPC port: {}", settings.grpc.port);
//!     Ok(())
//! }
//! ```

use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment, selects log format and verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Dev,
    Prod,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(AppEnv::Local),
            "dev" => Ok(AppEnv::Dev),
            "prod" => Ok(AppEnv::Prod),
            other => bail!("unknown APP_ENV '{other}' (expected local, dev or prod)"),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppEnv::Local => "local",
            AppEnv::Dev => "dev",
            AppEnv::Prod => "prod",
        })
    }
}

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: AppEnv,
    pub storage: StorageSettings,
    pub jwt: JwtSettings,
    pub grpc: GrpcSettings,
}

impl Settings {
    /// Load settings from environment variables
    ///
    /// A `.env` file is honoured in debug builds.
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            env: env::var("APP_ENV")
                .unwrap_or_else(|_| "local".to_string())
                .parse()?,
            storage: StorageSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            grpc: GrpcSettings::from_env()?,
        })
    }
}

/// SQLite storage settings
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub path: String,
    pub max_connections: u32,
}

impl StorageSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            path: env::var("SSO_STORAGE_PATH").context("SSO_STORAGE_PATH must be set")?,
            max_connections: env::var("SSO_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid SSO_DB_MAX_CONNECTIONS")?,
        })
    }
}

/// Token signing settings
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub token_ttl: Duration,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        let secret = env::var("SSO_JWT_SECRET").context("SSO_JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("SSO_JWT_SECRET must not be empty");
        }

        let ttl_seconds: u64 = env::var("SSO_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Invalid SSO_TOKEN_TTL_SECONDS")?;

        Ok(Self {
            secret,
            token_ttl: Duration::from_secs(ttl_seconds),
        })
    }
}

/// gRPC server configuration
#[derive(Debug, Clone)]
pub struct GrpcSettings {
    pub host: String,
    pub port: u16,
    /// Per-call budget for store access, tightened by the client's grpc-timeout
    pub timeout: Duration,
}

impl GrpcSettings {
    fn from_env() -> Result<Self> {
        let timeout_seconds: u64 = env::var("SSO_GRPC_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid SSO_GRPC_TIMEOUT_SECONDS")?;

        Ok(Self {
            host: env::var("SSO_GRPC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SSO_GRPC_PORT")
                .unwrap_or_else(|_| "44044".to_string())
                .parse()
                .context("Invalid SSO_GRPC_PORT")?,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}
