use crate::domain::model::{
    AuthActionResponse, CheckResponse, ErrorInfo, ErrorResponse, ForgotPasswordParams, Identity,
    LoginParams, RegisterParams, TokenClaims, UpdatePasswordParams,
};
use crate::domain::ports::{AuthEvents, AuthProvider, SessionStore};
use crate::firebase::FirebaseAuth;
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Auth provider over the identity-service client. Each framework action is
/// one client call plus envelope normalization; the raw error object never
/// crosses this boundary, only its message wrapped with the action-kind name.
pub struct FirebaseAuthProvider<S: SessionStore> {
    auth: FirebaseAuth<S>,
    events: Option<Arc<dyn AuthEvents>>,
    login_redirect: String,
}

impl<S: SessionStore> FirebaseAuthProvider<S> {
    pub fn new(auth: FirebaseAuth<S>) -> Self {
        Self {
            auth,
            events: None,
            login_redirect: "/".to_string(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn AuthEvents>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_login_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.login_redirect = redirect.into();
        self
    }

    pub fn client(&self) -> &FirebaseAuth<S> {
        &self.auth
    }

    async fn try_login(&self, params: &LoginParams) -> Result<()> {
        self.auth
            .sign_in(&params.email, &params.password, params.remember)
            .await?;
        let session = self
            .auth
            .current_session()
            .await
            .ok_or(BridgeError::Unauthenticated)?;
        if let Some(events) = &self.events {
            events.on_login(&session);
        }
        Ok(())
    }

    async fn try_register(&self, params: &RegisterParams) -> Result<()> {
        let session = self.auth.sign_up(&params.email, &params.password).await?;
        self.auth.send_email_verification(&session).await?;

        let session = match &params.display_name {
            Some(name) => self.auth.update_profile(name).await?,
            None => session,
        };

        if let Some(events) = &self.events {
            events.on_register(&session);
        }
        Ok(())
    }

    async fn try_update_password(&self, params: &UpdatePasswordParams) -> Result<()> {
        self.auth.update_password(&params.new_password).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: SessionStore> AuthProvider for FirebaseAuthProvider<S> {
    async fn login(&self, params: LoginParams) -> AuthActionResponse {
        match self.try_login(&params).await {
            Ok(()) => AuthActionResponse::ok_redirect(self.login_redirect.clone()),
            Err(e) => {
                tracing::debug!(email = %params.email, "login failed: {}", e);
                AuthActionResponse::failed("Login Error", e.to_string())
            }
        }
    }

    async fn register(&self, params: RegisterParams) -> AuthActionResponse {
        match self.try_register(&params).await {
            Ok(()) => AuthActionResponse::ok(),
            Err(e) => {
                tracing::debug!(email = %params.email, "registration failed: {}", e);
                AuthActionResponse::failed("Registration Error", e.to_string())
            }
        }
    }

    async fn check(&self) -> CheckResponse {
        match self.auth.current_session().await {
            Some(_) => CheckResponse {
                authenticated: true,
                error: None,
            },
            None => CheckResponse {
                authenticated: false,
                error: Some(ErrorInfo::new(
                    "Check Auth Error",
                    BridgeError::Unauthenticated.to_string(),
                )),
            },
        }
    }

    async fn logout(&self) -> AuthActionResponse {
        match self.auth.sign_out().await {
            Ok(()) => {
                if let Some(events) = &self.events {
                    events.on_logout();
                }
                AuthActionResponse::ok()
            }
            // a failed logout still redirects home
            Err(e) => AuthActionResponse::failed_redirect("Logout Error", e.to_string(), "/"),
        }
    }

    async fn forgot_password(&self, params: ForgotPasswordParams) -> AuthActionResponse {
        match self.auth.send_password_reset(&params.email).await {
            Ok(()) => AuthActionResponse::ok(),
            Err(e) => AuthActionResponse::failed("Forgot Password Error", e.to_string()),
        }
    }

    async fn update_password(&self, params: UpdatePasswordParams) -> AuthActionResponse {
        match self.try_update_password(&params).await {
            Ok(()) => AuthActionResponse::ok(),
            Err(e) => AuthActionResponse::failed("Update Password Error", e.to_string()),
        }
    }

    async fn get_identity(&self) -> Identity {
        match self.auth.current_session().await {
            Some(session) => Identity {
                email: session.email,
                name: session.display_name,
            },
            None => Identity::default(),
        }
    }

    async fn get_permissions(&self) -> Result<TokenClaims> {
        self.auth.token_claims().await
    }

    async fn on_error(&self) -> ErrorResponse {
        ErrorResponse {
            redirect_to: Some("/".to_string()),
            logout: false,
            error: Some(ErrorInfo::new("Error", "An error occurred")),
        }
    }
}
