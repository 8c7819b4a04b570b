use crate::domain::model::{
    AuthActionResponse, AuthSession, CheckResponse, DataEnvelope, ErrorResponse, FieldMap, Filter,
    ForgotPasswordParams, Identity, LoginParams, Record, RegisterParams, Sorter, TokenClaims,
    UpdatePasswordParams,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Framework auth contract. Every action is fail-soft: failures come back as
/// `{ success: false, error }` envelopes, never as `Err`. The one exception is
/// `get_permissions`, which propagates like the underlying client does.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, params: LoginParams) -> AuthActionResponse;
    async fn register(&self, params: RegisterParams) -> AuthActionResponse;
    async fn check(&self) -> CheckResponse;
    async fn logout(&self) -> AuthActionResponse;
    async fn forgot_password(&self, params: ForgotPasswordParams) -> AuthActionResponse;
    async fn update_password(&self, params: UpdatePasswordParams) -> AuthActionResponse;
    async fn get_identity(&self) -> Identity;
    async fn get_permissions(&self) -> Result<TokenClaims>;
    async fn on_error(&self) -> ErrorResponse;
}

/// Framework data contract. Unlike auth actions, every method propagates
/// backend failures to the caller unmodified.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn get_list(
        &self,
        resource: &str,
        sorters: &[Sorter],
        filters: &[Filter],
    ) -> Result<DataEnvelope<Vec<Record>>>;

    async fn get_one(&self, resource: &str, id: &str) -> Result<DataEnvelope<Record>>;

    async fn get_many(&self, resource: &str, ids: &[String]) -> Result<DataEnvelope<Vec<Record>>>;

    async fn create(&self, resource: &str, variables: FieldMap) -> Result<DataEnvelope<Record>>;

    async fn create_many(
        &self,
        resource: &str,
        items: Vec<FieldMap>,
    ) -> Result<DataEnvelope<Vec<Record>>>;

    async fn update(
        &self,
        resource: &str,
        id: &str,
        variables: FieldMap,
    ) -> Result<DataEnvelope<FieldMap>>;

    async fn update_many(&self, resource: &str, ids: &[String], variables: FieldMap) -> Result<()>;

    async fn delete_one(&self, resource: &str, id: &str) -> Result<()>;

    async fn delete_many(&self, resource: &str, ids: &[String]) -> Result<()>;

    /// No base-URL concept applies to this backend.
    fn get_api_url(&self) -> String {
        String::new()
    }
}

/// Session persistence port. The file-backed implementation gives the
/// "remember me" branch; the in-memory one is session-scoped.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<AuthSession>>;
    async fn save(&self, session: &AuthSession) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Optional side-effect hooks fired after the corresponding auth action
/// succeeds.
pub trait AuthEvents: Send + Sync {
    fn on_login(&self, _session: &AuthSession) {}
    fn on_register(&self, _session: &AuthSession) {}
    fn on_logout(&self) {}
}
