use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Api { code: u16, message: String },

    #[error("no user is currently authenticated")]
    Unauthenticated,

    #[error("account not found after registration")]
    MissingAccount,

    #[error("document {id} not found in {resource}")]
    NotFound { resource: String, id: String },

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
