pub mod config;
pub mod core;
pub mod domain;
pub mod firebase;
pub mod utils;

pub use config::FirebaseConfig;
pub use core::{FirebaseAuthProvider, FirestoreDataProvider};
pub use domain::model::{
    AuthActionResponse, AuthSession, CheckResponse, DataEnvelope, ErrorInfo, ErrorResponse,
    FieldMap, Filter, FilterOperator, ForgotPasswordParams, Identity, LoginParams, Record,
    RegisterParams, SortOrder, Sorter, TokenClaims, UpdatePasswordParams,
};
pub use domain::ports::{AuthEvents, AuthProvider, DataProvider, SessionStore};
pub use firebase::{FileSessionStore, FirebaseAuth, FirestoreClient, MemorySessionStore};
pub use utils::error::{BridgeError, Result};
