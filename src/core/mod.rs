pub mod auth;
pub mod data;
pub mod query;

pub use auth::FirebaseAuthProvider;
pub use data::FirestoreDataProvider;
pub use query::{StructuredQuery, WhereOp};
