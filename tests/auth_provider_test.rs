use base64ct::{Base64UrlUnpadded, Encoding};
use firebridge::{
    AuthEvents, AuthProvider, BridgeError, FirebaseAuth, FirebaseAuthProvider, FirebaseConfig,
    ForgotPasswordParams, LoginParams, MemorySessionStore, RegisterParams, UpdatePasswordParams,
};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn make_token(claims: &serde_json::Value) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{}.{}.signature", header, payload)
}

fn test_config(server: &MockServer) -> FirebaseConfig {
    let mut config = FirebaseConfig::new("test-key", "demo-project");
    config.auth_url = server.base_url();
    config.token_url = server.base_url();
    config.firestore_url = server.base_url();
    config
}

async fn provider(server: &MockServer) -> FirebaseAuthProvider<MemorySessionStore> {
    let config = test_config(server);
    FirebaseAuthProvider::new(FirebaseAuth::connect(&config, MemorySessionStore::new()).await)
}

fn token_body(email: &str, claims: &serde_json::Value) -> serde_json::Value {
    json!({
        "idToken": make_token(claims),
        "refreshToken": "refresh-1",
        "expiresIn": "3600",
        "localId": "u1",
        "email": email
    })
}

#[tokio::test]
async fn test_login_with_valid_credentials_redirects() {
    let server = MockServer::start();
    let signin_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:signInWithPassword")
            .query_param("key", "test-key")
            .json_body_partial(r#"{"email": "ada@example.com", "returnSecureToken": true}"#);
        then.status(200)
            .json_body(token_body("ada@example.com", &json!({"user_id": "u1"})));
    });

    let provider = provider(&server).await;
    let response = provider
        .login(LoginParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            remember: false,
        })
        .await;

    signin_mock.assert();
    assert!(response.success);
    assert_eq!(response.redirect_to.as_deref(), Some("/"));
    assert!(response.error.is_none());

    let check = provider.check().await;
    assert!(check.authenticated);
}

#[tokio::test]
async fn test_login_with_bad_credentials_never_rejects() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signInWithPassword");
        then.status(400)
            .json_body(json!({"error": {"code": 400, "message": "INVALID_PASSWORD"}}));
    });

    let provider = provider(&server).await;
    let response = provider
        .login(LoginParams {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
            remember: false,
        })
        .await;

    assert!(!response.success);
    let error = response.error.unwrap();
    assert_eq!(error.name, "Login Error");
    assert!(error.message.contains("INVALID_PASSWORD"));
}

#[tokio::test]
async fn test_register_with_duplicate_email_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signUp");
        then.status(400)
            .json_body(json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}}));
    });

    let provider = provider(&server).await;
    let response = provider
        .register(RegisterParams {
            email: "taken@example.com".to_string(),
            password: "hunter2".to_string(),
            display_name: None,
        })
        .await;

    assert!(!response.success);
    let error = response.error.unwrap();
    assert_eq!(error.name, "Registration Error");
    assert!(error.message.contains("EMAIL_EXISTS"));
}

#[tokio::test]
async fn test_register_sends_verification_and_sets_display_name() {
    let server = MockServer::start();
    let signup_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signUp");
        then.status(200)
            .json_body(token_body("ada@example.com", &json!({"user_id": "u1"})));
    });
    let oob_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:sendOobCode")
            .json_body_partial(r#"{"requestType": "VERIFY_EMAIL"}"#);
        then.status(200).json_body(json!({"email": "ada@example.com"}));
    });
    let profile_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:update")
            .json_body_partial(r#"{"displayName": "Ada"}"#);
        then.status(200).json_body(json!({"displayName": "Ada"}));
    });

    let provider = provider(&server).await;
    let response = provider
        .register(RegisterParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            display_name: Some("Ada".to_string()),
        })
        .await;

    signup_mock.assert();
    oob_mock.assert();
    profile_mock.assert();
    assert!(response.success);

    let identity = provider.get_identity().await;
    assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    assert_eq!(identity.name.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_register_without_account_payload_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signUp");
        then.status(200).json_body(json!({}));
    });

    let provider = provider(&server).await;
    let response = provider
        .register(RegisterParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            display_name: None,
        })
        .await;

    assert!(!response.success);
    let error = response.error.unwrap();
    assert_eq!(error.name, "Registration Error");
    assert!(error.message.contains("account not found after registration"));
}

#[tokio::test]
async fn test_check_without_session_is_unauthenticated() {
    let server = MockServer::start();
    let provider = provider(&server).await;

    let check = provider.check().await;
    assert!(!check.authenticated);
    assert_eq!(check.error.unwrap().name, "Check Auth Error");
}

#[tokio::test]
async fn test_update_password_without_session_fails() {
    let server = MockServer::start();
    let provider = provider(&server).await;

    let response = provider
        .update_password(UpdatePasswordParams {
            new_password: "new-secret".to_string(),
        })
        .await;

    assert!(!response.success);
    let error = response.error.unwrap();
    assert_eq!(error.name, "Update Password Error");
    assert!(error.message.contains("no user is currently authenticated"));
}

#[tokio::test]
async fn test_update_password_with_session_succeeds() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signInWithPassword");
        then.status(200)
            .json_body(token_body("ada@example.com", &json!({"user_id": "u1"})));
    });
    let update_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:update")
            .json_body_partial(r#"{"password": "new-secret"}"#);
        then.status(200)
            .json_body(token_body("ada@example.com", &json!({"user_id": "u1", "v": 2})));
    });

    let provider = provider(&server).await;
    provider
        .login(LoginParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            remember: false,
        })
        .await;

    let response = provider
        .update_password(UpdatePasswordParams {
            new_password: "new-secret".to_string(),
        })
        .await;

    update_mock.assert();
    assert!(response.success);
}

#[tokio::test]
async fn test_get_permissions_without_session_propagates() {
    let server = MockServer::start();
    let provider = provider(&server).await;

    let result = provider.get_permissions().await;
    assert!(matches!(result, Err(BridgeError::Unauthenticated)));
}

#[tokio::test]
async fn test_get_permissions_returns_token_claims() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signInWithPassword");
        then.status(200).json_body(token_body(
            "ada@example.com",
            &json!({"user_id": "u1", "role": "admin"}),
        ));
    });

    let provider = provider(&server).await;
    provider
        .login(LoginParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            remember: false,
        })
        .await;

    let claims = provider.get_permissions().await.unwrap();
    assert_eq!(claims.get("role").unwrap(), "admin");
}

#[tokio::test]
async fn test_logout_terminates_the_session() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signInWithPassword");
        then.status(200)
            .json_body(token_body("ada@example.com", &json!({"user_id": "u1"})));
    });

    let provider = provider(&server).await;
    provider
        .login(LoginParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            remember: false,
        })
        .await;
    assert!(provider.check().await.authenticated);

    let response = provider.logout().await;
    assert!(response.success);
    assert!(!provider.check().await.authenticated);

    let identity = provider.get_identity().await;
    assert!(identity.email.is_none());
}

#[tokio::test]
async fn test_forgot_password_sends_reset_mail() {
    let server = MockServer::start();
    let oob_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:sendOobCode")
            .json_body_partial(r#"{"requestType": "PASSWORD_RESET", "email": "ada@example.com"}"#);
        then.status(200).json_body(json!({"email": "ada@example.com"}));
    });

    let provider = provider(&server).await;
    let response = provider
        .forgot_password(ForgotPasswordParams {
            email: "ada@example.com".to_string(),
        })
        .await;

    oob_mock.assert();
    assert!(response.success);
}

#[tokio::test]
async fn test_forgot_password_failure_is_enveloped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:sendOobCode");
        then.status(400)
            .json_body(json!({"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}));
    });

    let provider = provider(&server).await;
    let response = provider
        .forgot_password(ForgotPasswordParams {
            email: "nobody@example.com".to_string(),
        })
        .await;

    assert!(!response.success);
    assert_eq!(response.error.unwrap().name, "Forgot Password Error");
}

#[tokio::test]
async fn test_on_error_returns_fixed_fallback() {
    let server = MockServer::start();
    let provider = provider(&server).await;

    let response = provider.on_error().await;
    assert_eq!(response.redirect_to.as_deref(), Some("/"));
    assert!(!response.logout);
    assert_eq!(response.error.unwrap().name, "Error");
}

#[derive(Default)]
struct RecordingEvents {
    logins: AtomicUsize,
    registrations: AtomicUsize,
    logouts: AtomicUsize,
}

impl AuthEvents for RecordingEvents {
    fn on_login(&self, _session: &firebridge::AuthSession) {
        self.logins.fetch_add(1, Ordering::SeqCst);
    }

    fn on_register(&self, _session: &firebridge::AuthSession) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
    }

    fn on_logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_auth_events_fire_on_success_only() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signInWithPassword");
        then.status(200)
            .json_body(token_body("ada@example.com", &json!({"user_id": "u1"})));
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signUp");
        then.status(400)
            .json_body(json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}}));
    });

    let events = Arc::new(RecordingEvents::default());
    let config = test_config(&server);
    let provider =
        FirebaseAuthProvider::new(FirebaseAuth::connect(&config, MemorySessionStore::new()).await)
            .with_events(events.clone());

    provider
        .login(LoginParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            remember: false,
        })
        .await;
    provider
        .register(RegisterParams {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            display_name: None,
        })
        .await;
    provider.logout().await;

    assert_eq!(events.logins.load(Ordering::SeqCst), 1);
    // the failed registration must not fire the hook
    assert_eq!(events.registrations.load(Ordering::SeqCst), 0);
    assert_eq!(events.logouts.load(Ordering::SeqCst), 1);
}
