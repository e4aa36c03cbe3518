//! Environment configuration for the demo server.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const JWT_SECRET_ENV: &str = "SCOPEGATE_JWT_SECRET";
pub const BIND_ADDR_ENV: &str = "SCOPEGATE_BIND_ADDR";
pub const EMAIL_CONFIRMATION_ENV: &str = "SCOPEGATE_EMAIL_CONFIRMATION";
pub const SEED_FILE_ENV: &str = "SCOPEGATE_SEED_FILE";

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a boolean (true/false/1/0), got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must be a socket address, got '{value}'")]
    InvalidAddr { var: &'static str, value: String },

    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file {path}: {source}")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load seed: {0}")]
    SeedLoad(String),

    #[error("inconsistent seed: {0}")]
    Seed(#[from] scopegate_auth::memory::SeedError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub email_confirmation: bool,
    pub seed_file: Option<PathBuf>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in prod).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup(JWT_SECRET_ENV).unwrap_or_else(|| {
            tracing::warn!("{JWT_SECRET_ENV} not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let bind_addr = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: BIND_ADDR_ENV,
            value: bind_addr.clone(),
        })?;

        let email_confirmation = match lookup(EMAIL_CONFIRMATION_ENV) {
            Some(value) => parse_bool(EMAIL_CONFIRMATION_ENV, &value)?,
            None => false,
        };

        Ok(Self {
            jwt_secret,
            bind_addr,
            email_confirmation,
            seed_file: lookup(SEED_FILE_ENV).map(PathBuf::from),
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert!(!config.email_confirmation);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = ApiConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "s3cret"),
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (EMAIL_CONFIRMATION_ENV, "TRUE"),
            (SEED_FILE_ENV, "/etc/scopegate/seed.json"),
        ]))
        .unwrap();

        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(config.email_confirmation);
        assert_eq!(
            config.seed_file,
            Some(PathBuf::from("/etc/scopegate/seed.json"))
        );
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = ApiConfig::from_lookup(lookup(&[(EMAIL_CONFIRMATION_ENV, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));

        let err = ApiConfig::from_lookup(lookup(&[(BIND_ADDR_ENV, "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));
    }
}
