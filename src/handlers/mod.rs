//! HTTP handlers for account operations and lookups.

pub mod account;
pub mod lookup;
pub use account::*;
pub use lookup::*;
