//! Service configuration

use std::env;
use std::fmt;

use serde::Deserialize;

/// Used when `JWT_SECRET` is unset; only suitable for local development
const DEV_JWT_SECRET: &str = "coursehub-dev-secret";

#[derive(Clone, Deserialize)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database file; the in-memory store is used when unset
    pub database_path: Option<String>,

    /// Shared secret for verifying auth tokens
    pub jwt_secret: String,

    /// How old a roster entry's cached stats may get before it is
    /// recomputed from the progress ledger
    pub roster_staleness_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            roster_staleness_secs: 300,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("roster_staleness_secs", &self.roster_staleness_secs)
            .finish()
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            defaults.jwt_secret.clone()
        });

        Self {
            port: parse_var("PORT").unwrap_or(defaults.port),
            database_path: env::var("DATABASE_PATH").ok().filter(|p| !p.is_empty()),
            jwt_secret,
            roster_staleness_secs: parse_var("ROSTER_STALENESS_SECS")
                .unwrap_or(defaults.roster_staleness_secs),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}
