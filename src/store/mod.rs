//! Record store boundary. Account services only talk to [`AccountStore`]; PostgreSQL and
//! in-memory backends implement it.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgAccountStore;

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One table row as a JSON object keyed by column name.
pub type Record = Map<String, Value>;

/// Equality filter on a single column, optionally excluding rows where a second column
/// holds a given value.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
    /// Rows whose column equals this value are skipped. A missing or null column never equals it.
    pub exclude: Option<(String, Value)>,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter {
            column: column.into(),
            value: value.into(),
            exclude: None,
        }
    }

    pub fn and_not(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.exclude = Some((column.into(), value.into()));
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.column) == Some(&self.value)
            && self
                .exclude
                .as_ref()
                .map_or(true, |(column, value)| record.get(column) != Some(value))
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert one record and return the stored row, including generated columns.
    async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError>;

    /// Apply `patch` to every row matching `filter`; returns the rows as stored afterwards.
    async fn update(&self, table: &str, patch: &Record, filter: &Filter) -> Result<Vec<Record>, StoreError>;

    /// Remove every row matching `filter`; returns the removed rows.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, StoreError>;

    /// Project `columns` (all when empty) from rows matching `filter`, or from every row.
    async fn select(&self, table: &str, columns: &[String], filter: Option<&Filter>) -> Result<Vec<Record>, StoreError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
