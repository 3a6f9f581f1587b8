// src/common/config.rs
//! Process configuration, built once at startup

use std::env;

/// Runtime configuration for the service.
///
/// Constructed a single time in `main` and carried in [`crate::common::AppState`];
/// no other code reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Build configuration from the process environment, falling back to
    /// local-development defaults for anything unset.
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://profiles.db".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let cors_origins = Self::parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        Self {
            database_url,
            port,
            cors_origins,
        }
    }

    fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
