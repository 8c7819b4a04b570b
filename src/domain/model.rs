use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Schema-free field mapping of one document. Shape is caller-defined per
/// resource.
pub type FieldMap = HashMap<String, serde_json::Value>;

/// Decoded claims of an identity token.
pub type TokenClaims = HashMap<String, serde_json::Value>;

/// One row of a named resource: the stored fields merged with the document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Uniform `{ data }` envelope returned by every data-provider read/write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterParams {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordParams {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordParams {
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result envelope of a mutating auth action. `success: false` always pairs
/// with a populated `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl AuthActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            redirect_to: None,
            error: None,
        }
    }

    pub fn ok_redirect(to: impl Into<String>) -> Self {
        Self {
            success: true,
            redirect_to: Some(to.into()),
            error: None,
        }
    }

    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            redirect_to: None,
            error: Some(ErrorInfo::new(name, message)),
        }
    }

    pub fn failed_redirect(name: &str, message: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            success: false,
            redirect_to: Some(to.into()),
            error: Some(ErrorInfo::new(name, message)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Fixed fallback returned by the generic error hook: redirect home, no
/// forced logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub redirect_to: Option<String>,
    pub logout: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Snapshot of the currently authenticated principal as issued by the
/// identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Treats tokens within 30s of expiry as already expired so a restored
    /// session is never handed out with no usable lifetime left.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::seconds(30)
    }
}

/// Generic filter operator vocabulary of the front-end framework.
///
/// An unrecognized operator string parses as `In`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FilterOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Nin,
}

impl FilterOperator {
    pub fn parse(s: &str) -> Self {
        match s {
            "eq" => FilterOperator::Eq,
            "ne" => FilterOperator::Ne,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "nin" => FilterOperator::Nin,
            _ => FilterOperator::In,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(s: String) -> Self {
        FilterOperator::parse(&s)
    }
}

impl FromStr for FilterOperator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(FilterOperator::parse(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One generic query constraint, translated per-backend into native syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sorter {
    pub field: String,
    pub order: SortOrder,
}
