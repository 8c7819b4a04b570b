use crate::config::FirebaseConfig;
use crate::domain::model::{AuthSession, TokenClaims};
use crate::domain::ports::SessionStore;
use crate::firebase::api_error_from_response;
use crate::firebase::session::{decode_token_claims, AuthState};
use crate::utils::error::{BridgeError, Result};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Identity Toolkit client. Owns the auth-state channel and the session
/// store handed in by the caller; everything else is per-call REST traffic.
pub struct FirebaseAuth<S: SessionStore> {
    http: Client,
    api_key: String,
    auth_url: String,
    token_url: String,
    store: S,
    // whether the current session was written through the store ("remember")
    persisted: AtomicBool,
    state: watch::Sender<AuthState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<String>,
    local_id: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
}

impl TokenResponse {
    fn expiry_seconds(&self) -> i64 {
        self.expires_in
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS)
    }

    fn into_session(self) -> Result<AuthSession> {
        let expires_at = Utc::now() + Duration::seconds(self.expiry_seconds());
        let id_token = self
            .id_token
            .filter(|t| !t.is_empty())
            .ok_or(BridgeError::MissingAccount)?;

        Ok(AuthSession {
            local_id: self.local_id.unwrap_or_default(),
            email: self.email,
            display_name: self.display_name,
            id_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            expires_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    user_id: Option<String>,
}

impl<S: SessionStore> FirebaseAuth<S> {
    /// Builds the client and resolves the initial auth state from the store,
    /// refreshing a persisted-but-expired session before handing it out.
    pub async fn connect(config: &FirebaseConfig, store: S) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        let auth = Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.trim_end_matches('/').to_string(),
            store,
            persisted: AtomicBool::new(false),
            state,
        };
        auth.restore_session().await;
        auth
    }

    async fn restore_session(&self) {
        match self.store.load().await {
            Ok(Some(session)) => {
                self.persisted.store(true, Ordering::SeqCst);
                let session = if session.is_expired() {
                    match self.refresh_session(&session).await {
                        Ok(refreshed) => refreshed,
                        Err(e) => {
                            tracing::warn!("stored session could not be refreshed: {}", e);
                            self.persisted.store(false, Ordering::SeqCst);
                            if let Err(e) = self.store.clear().await {
                                tracing::warn!("failed to clear stale session: {}", e);
                            }
                            self.state.send_replace(AuthState::SignedOut);
                            return;
                        }
                    }
                } else {
                    session
                };
                tracing::debug!(local_id = %session.local_id, "restored persisted session");
                self.state.send_replace(AuthState::SignedIn(session));
            }
            Ok(None) => {
                self.state.send_replace(AuthState::SignedOut);
            }
            Err(e) => {
                tracing::warn!("session store unreadable: {}", e);
                self.state.send_replace(AuthState::SignedOut);
            }
        }
    }

    /// One-shot pull read of the push-style auth-state channel: subscribe,
    /// take the first resolved state, drop the receiver, return the snapshot.
    pub async fn current_session(&self) -> Option<AuthSession> {
        let mut rx = self.state.subscribe();
        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                AuthState::SignedIn(session) => return Some(session),
                AuthState::SignedOut => return None,
                AuthState::Unknown => {
                    if rx.changed().await.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    /// Live subscription for callers that want to observe sign-in/sign-out
    /// transitions instead of a single snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str, remember: bool) -> Result<AuthSession> {
        tracing::debug!(%email, remember, "signing in");
        let response: TokenResponse = self
            .execute(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let session = response.into_session()?;

        self.persisted.store(remember, Ordering::SeqCst);
        if remember {
            self.store.save(&session).await?;
        } else if let Err(e) = self.store.clear().await {
            tracing::warn!("failed to clear previous session: {}", e);
        }

        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        tracing::debug!(%email, "registering account");
        let response: TokenResponse = self
            .execute(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let session = response.into_session()?;

        // a registration replaces whatever principal was remembered before
        self.persisted.store(false, Ordering::SeqCst);
        if let Err(e) = self.store.clear().await {
            tracing::warn!("failed to clear previous session: {}", e);
        }

        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(session)
    }

    pub async fn send_email_verification(&self, session: &AuthSession) -> Result<()> {
        let _: serde_json::Value = self
            .execute(
                "sendOobCode",
                json!({ "requestType": "VERIFY_EMAIL", "idToken": session.id_token }),
            )
            .await?;
        Ok(())
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        tracing::debug!(%email, "sending password reset mail");
        let _: serde_json::Value = self
            .execute(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    pub async fn update_profile(&self, display_name: &str) -> Result<AuthSession> {
        let mut session = self
            .current_session()
            .await
            .ok_or(BridgeError::Unauthenticated)?;

        let _: serde_json::Value = self
            .execute(
                "update",
                json!({
                    "idToken": session.id_token,
                    "displayName": display_name,
                    "returnSecureToken": false
                }),
            )
            .await?;

        session.display_name = Some(display_name.to_string());
        self.publish_session(session.clone()).await?;
        Ok(session)
    }

    /// Changes the credential of the signed-in user. The backend rotates the
    /// tokens on this call, so the session is rebuilt from the response.
    pub async fn update_password(&self, new_password: &str) -> Result<AuthSession> {
        let current = self
            .current_session()
            .await
            .ok_or(BridgeError::Unauthenticated)?;

        let response: TokenResponse = self
            .execute(
                "update",
                json!({
                    "idToken": current.id_token,
                    "password": new_password,
                    "returnSecureToken": true
                }),
            )
            .await?;

        let mut session = current;
        if let Some(token) = response.id_token.as_deref().filter(|t| !t.is_empty()) {
            session.expires_at = Utc::now() + Duration::seconds(response.expiry_seconds());
            session.id_token = token.to_string();
        }
        if let Some(refresh) = response.refresh_token.filter(|t| !t.is_empty()) {
            session.refresh_token = refresh;
        }

        self.publish_session(session.clone()).await?;
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<()> {
        tracing::debug!("signing out");
        self.state.send_replace(AuthState::SignedOut);
        self.persisted.store(false, Ordering::SeqCst);
        self.store.clear().await
    }

    /// Claims of the current identity token; fails when nobody is signed in.
    pub async fn token_claims(&self) -> Result<TokenClaims> {
        let session = self
            .current_session()
            .await
            .ok_or(BridgeError::Unauthenticated)?;
        decode_token_claims(&session.id_token)
    }

    async fn refresh_session(&self, stale: &AuthSession) -> Result<AuthSession> {
        tracing::debug!(local_id = %stale.local_id, "refreshing expired session");
        let url = format!("{}/v1/token?key={}", self.token_url, self.api_key);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", stale.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }

        let refreshed: RefreshResponse = response.json().await?;
        let ttl = refreshed
            .expires_in
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let session = AuthSession {
            local_id: refreshed.user_id.unwrap_or_else(|| stale.local_id.clone()),
            email: stale.email.clone(),
            display_name: stale.display_name.clone(),
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Utc::now() + Duration::seconds(ttl),
        };

        self.store.save(&session).await?;
        Ok(session)
    }

    // republish a mutated session, writing it through the store when the
    // current principal was remembered
    async fn publish_session(&self, session: AuthSession) -> Result<()> {
        if self.persisted.load(Ordering::SeqCst) {
            self.store.save(&session).await?;
        }
        self.state.send_replace(AuthState::SignedIn(session));
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(&self, op: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/v1/accounts:{}?key={}", self.auth_url, op, self.api_key);
        tracing::debug!(operation = op, "calling identity service");

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }
        Ok(response.json().await?)
    }
}
