//! Session configuration.
//!
//! Strongly-typed configuration for the session core, loaded via the
//! `config` crate from environment variables. Fields with defaults can
//! be omitted when loading from the environment.

use serde::Deserialize;

/// Configuration for the session store and its collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the remote API (e.g. "https://api.example.com").
    pub api_base_url: String,

    /// Identity-check endpoint path. A GET here with a valid credential
    /// returns the user profile; 401 means the credential is dead.
    #[serde(default = "default_identity_path")]
    pub identity_path: String,

    /// Sign-in endpoint path, POSTed with `{login, password}`.
    #[serde(default = "default_signin_path")]
    pub signin_path: String,

    /// Durable-storage key under which the raw credential is persisted.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory for file-backed credential storage.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
}

fn default_identity_path() -> String {
    "/auth/login".to_string()
}

fn default_signin_path() -> String {
    "/auth/login".to_string()
}

fn default_storage_key() -> String {
    "jwt_token".to_string()
}

fn default_storage_dir() -> String {
    ".lantern".to_string()
}

impl SessionConfig {
    /// Creates a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            identity_path: default_identity_path(),
            signin_path: default_signin_path(),
            storage_key: default_storage_key(),
            storage_dir: default_storage_dir(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_has_reference_defaults() {
        let config = SessionConfig::new("https://api.example.com");
        assert_eq!(config.identity_path, "/auth/login");
        assert_eq!(config.signin_path, "/auth/login");
        assert_eq!(config.storage_key, "jwt_token");
        assert_eq!(config.storage_dir, ".lantern");
    }
}
