//! Account manager: schema-validated CRUD endpoints for venue, artist and attendee accounts.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod response;
pub mod routes;
pub mod search;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{builtin, resolve, Generation, SchemaRegistry, Settings};
pub use envelope::{ObjectType, Operation, RequestEnvelope};
pub use error::{AppError, ConfigError, StoreError, ValidationError};
pub use notify::{Email, HttpNotifier, LogNotifier, Notifier};
pub use routes::router;
pub use service::{AccountService, DeletePolicy, LookupService, RequestValidator};
pub use state::AppState;
pub use store::{AccountStore, MemoryStore, PgAccountStore};
