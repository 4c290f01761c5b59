//! Startup configuration loaded from the environment.

use std::env;

use thiserror::Error;

/// Default listen port for the webhook HTTP server.
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Invalid PORT value {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Immutable process configuration.
///
/// Constructed once in `main` before any handler can run. Handlers receive
/// everything they need through `HandlerDeps`; nothing reads the environment
/// after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub appwrite_endpoint: String,
    pub appwrite_project_id: String,
    pub appwrite_api_key: String,
    pub appwrite_database_id: String,
    pub appwrite_collection_id: String,
    /// Public base URL for webhook mode (`VERCEL_URL`). Only required when
    /// the bot is started with `--webhook`.
    pub webhook_base: Option<String>,
    /// Listen port for the webhook HTTP server.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// All missing required variables are collected and reported together so
    /// a misconfigured deployment fails with one complete message instead of
    /// one variable at a time.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing: Vec<String> = Vec::new();
        let mut required = |name: &str| -> String {
            match lookup(name) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        };

        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN");
        let appwrite_endpoint = required("APPWRITE_ENDPOINT");
        let appwrite_project_id = required("APPWRITE_PROJECT_ID");
        let appwrite_api_key = required("APPWRITE_API_KEY");
        let appwrite_database_id = required("APPWRITE_DATABASE_ID");
        let appwrite_collection_id = required("APPWRITE_COLLECTION_ID");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = match lookup("PORT") {
            Some(raw) if !raw.is_empty() => {
                raw.parse()
                    .map_err(|source| ConfigError::InvalidPort { value: raw.clone(), source })?
            }
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            telegram_bot_token,
            appwrite_endpoint,
            appwrite_project_id,
            appwrite_api_key,
            appwrite_database_id,
            appwrite_collection_id,
            webhook_base: lookup("VERCEL_URL").filter(|v| !v.is_empty()),
            port,
        })
    }
}
