use crate::domain::model::{AuthSession, TokenClaims};
use crate::utils::error::{BridgeError, Result};
use base64ct::{Base64UrlUnpadded, Encoding};

/// State published on the auth-state channel. `Unknown` only exists between
/// construction and the first restore resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Unknown,
    SignedOut,
    SignedIn(AuthSession),
}

impl AuthState {
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            AuthState::SignedIn(session) => Some(session),
            _ => None,
        }
    }
}

/// Decodes the claims of an identity token without verifying the signature,
/// the same read the hosted SDK performs client-side. The token is already
/// trusted here: it came from the identity service over TLS.
pub fn decode_token_claims(id_token: &str) -> Result<TokenClaims> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| BridgeError::InvalidToken {
            reason: "token is not a three-part JWT".to_string(),
        })?;

    let raw = Base64UrlUnpadded::decode_vec(payload).map_err(|e| BridgeError::InvalidToken {
        reason: format!("payload is not base64url: {}", e),
    })?;

    let claims: TokenClaims = serde_json::from_slice(&raw)?;
    Ok(claims)
}
