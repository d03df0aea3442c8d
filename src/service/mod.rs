//! Validation core and the account operations built on it.

pub mod identifier;
pub mod reconcile;
mod accounts;
mod lookup;
mod validation;

pub use accounts::{AccountService, DeletePolicy};
pub use lookup::LookupService;
pub use reconcile::{AttributeReport, Reconciler, UnknownTypePolicy};
pub use validation::{RequestValidator, ValidatedRequest};
