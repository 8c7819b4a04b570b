use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_auth_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com".to_string()
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

/// Connection settings for both backends. The base URLs default to the
/// hosted endpoints and can be pointed at the emulators (or a mock server in
/// tests) instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,

    #[serde(default = "default_database_id")]
    pub database_id: String,

    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,

    /// Where the "remember me" session is persisted across restarts.
    #[serde(default)]
    pub session_file: Option<String>,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            database_id: default_database_id(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            firestore_url: default_firestore_url(),
            session_file: None,
        }
    }

    /// Loads a config from a TOML file. `FIREBASE_API_KEY` in the environment
    /// overrides the file so the key can stay out of committed configs.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        let mut config: FirebaseConfig =
            toml::from_str(&raw).map_err(|e| BridgeError::Config {
                message: format!("failed to parse {}: {}", path.as_ref().display(), e),
            })?;

        if let Ok(key) = std::env::var("FIREBASE_API_KEY") {
            config.api_key = key;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for FirebaseConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_non_empty_string("project_id", &self.project_id)?;
        validate_non_empty_string("database_id", &self.database_id)?;
        validate_url("auth_url", &self.auth_url)?;
        validate_url("token_url", &self.token_url)?;
        validate_url("firestore_url", &self.firestore_url)?;
        Ok(())
    }
}
