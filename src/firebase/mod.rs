// Concrete backend clients: Identity Toolkit and Firestore over their REST
// surfaces. Nothing above this layer knows about wire formats.

pub mod auth_client;
pub mod firestore_client;
pub mod session;
pub mod store;
pub mod value;

pub use auth_client::FirebaseAuth;
pub use firestore_client::FirestoreClient;
pub use session::AuthState;
pub use store::{FileSessionStore, MemorySessionStore};

use crate::utils::error::BridgeError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Folds a non-2xx backend response into a typed error, preferring the
/// message of the service's `{"error": {...}}` envelope over the raw body.
pub(crate) async fn api_error_from_response(response: reqwest::Response) -> BridgeError {
    let code = response.status().as_u16();
    let fallback = response.status().to_string();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| if body.is_empty() { fallback } else { body });

    BridgeError::Api { code, message }
}
