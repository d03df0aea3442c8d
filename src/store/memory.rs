//! In-memory account store. Used when no database is configured and by tests.

use super::{AccountStore, Filter, Record};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    /// Column filled with a fresh uuid on insert when the record has none.
    id_field: Option<String>,
    /// Columns that updates silently leave untouched.
    ignored: HashSet<String>,
    /// When set, every call fails with this message.
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new(id_field: impl Into<String>) -> Self {
        MemoryStore {
            id_field: Some(id_field.into()),
            ..MemoryStore::default()
        }
    }

    pub fn with_rows(self, table: &str, rows: Vec<Record>) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.entry(table.to_string()).or_default().extend(rows);
        }
        self
    }

    /// A store whose every operation fails, as an unreachable backend would.
    pub fn failing(message: impl Into<String>) -> Self {
        MemoryStore {
            failure: Some(message.into()),
            ..MemoryStore::default()
        }
    }

    /// Updates to `column` are accepted but not stored.
    pub fn ignoring_column(mut self, column: impl Into<String>) -> Self {
        self.ignored.insert(column.into());
        self
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .map(|t| t.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<Record>>>, StoreError> {
        self.check()?;
        self.tables.read().map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<Record>>>, StoreError> {
        self.check()?;
        self.tables.write().map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }
}

fn project(row: &Record, columns: &[String]) -> Record {
    if columns.is_empty() {
        return row.clone();
    }
    columns
        .iter()
        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, table: &str, mut record: Record) -> Result<Record, StoreError> {
        let mut tables = self.write()?;
        if let Some(id_field) = &self.id_field {
            record
                .entry(id_field.clone())
                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        }
        tables.entry(table.to_string()).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: &str, patch: &Record, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        let mut tables = self.write()?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| filter.matches(r)) {
            for (k, v) in patch {
                if !self.ignored.contains(k) {
                    row.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        let mut tables = self.write()?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Record>, Vec<Record>) = rows.drain(..).partition(|r| filter.matches(r));
        *rows = kept;
        Ok(removed)
    }

    async fn select(&self, table: &str, columns: &[String], filter: Option<&Filter>) -> Result<Vec<Record>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| filter.map_or(true, |f| f.matches(r)))
                    .map(|r| project(r, columns))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => Record::new(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_missing_id() {
        let store = MemoryStore::new("user_id");
        let row = store.insert("venues", record(json!({"email": "a@b.com"}))).await.unwrap();
        assert!(row.get("user_id").and_then(Value::as_str).is_some());

        let kept = store
            .insert("venues", record(json!({"user_id": "1234567890"})))
            .await
            .unwrap();
        assert_eq!(kept["user_id"], json!("1234567890"));
        assert_eq!(store.rows("venues").len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_touch_matching_rows_only() {
        let store = MemoryStore::new("user_id").with_rows(
            "artists",
            vec![
                record(json!({"user_id": "1", "bio": "old"})),
                record(json!({"user_id": "2", "bio": "old"})),
            ],
        );
        let updated = store
            .update("artists", &record(json!({"bio": "new"})), &Filter::eq("user_id", "1"))
            .await
            .unwrap();
        assert_eq!(updated, vec![record(json!({"user_id": "1", "bio": "new"}))]);

        let removed = store.delete("artists", &Filter::eq("user_id", "2")).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(store.rows("artists").len(), 1);
    }

    #[tokio::test]
    async fn update_skips_excluded_rows() {
        let store = MemoryStore::new("user_id").with_rows(
            "venues",
            vec![record(json!({"user_id": "1", "status": "Inactive"}))],
        );
        let filter = Filter::eq("user_id", "1").and_not("status", "Inactive");
        let patch = record(json!({"status": "Inactive"}));
        assert!(store.update("venues", &patch, &filter).await.unwrap().is_empty());

        let store = MemoryStore::new("user_id").with_rows("venues", vec![record(json!({"user_id": "1"}))]);
        assert_eq!(store.update("venues", &patch, &filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn select_projects_requested_columns() {
        let store = MemoryStore::new("user_id")
            .with_rows("artists", vec![record(json!({"user_id": "1", "artist_name": "Drake", "bio": "x"}))]);
        let rows = store.select("artists", &["artist_name".into()], None).await.unwrap();
        assert_eq!(rows, vec![record(json!({"artist_name": "Drake"}))]);
        assert!(store.select("venues", &[], None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ignored_columns_are_not_written() {
        let store = MemoryStore::new("user_id")
            .with_rows("venues", vec![record(json!({"user_id": "1", "city": "York"}))])
            .ignoring_column("city");
        let rows = store
            .update("venues", &record(json!({"city": "Leeds"})), &Filter::eq("user_id", "1"))
            .await
            .unwrap();
        assert_eq!(rows[0]["city"], json!("York"));
    }

    #[tokio::test]
    async fn failing_store_reports_backend_error() {
        let store = MemoryStore::failing("Database connection error");
        let err = store.select("artists", &[], None).await.unwrap_err();
        assert_eq!(err.to_string(), "Database connection error");
        assert!(store.ping().await.is_err());
    }
}
