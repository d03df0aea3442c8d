//! PostgreSQL account store. Every table lives in one configurable schema.

use super::{AccountStore, Filter, Record};
use crate::error::StoreError;
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::PgPool;

const MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
    schema: String,
}

impl PgAccountStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgAccountStore {
            pool,
            schema: schema.into(),
        }
    }

    pub async fn connect(database_url: &str, schema: impl Into<String>) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, schema))
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Record>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_record).collect())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError> {
        let q = sql::insert(&self.schema, table, &record);
        self.fetch_all(&q)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NoRow(table.to_string()))
    }

    async fn update(&self, table: &str, patch: &Record, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        if patch.is_empty() {
            return self.select(table, &[], Some(filter)).await;
        }
        self.fetch_all(&sql::update(&self.schema, table, patch, filter)).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        self.fetch_all(&sql::delete(&self.schema, table, filter)).await
    }

    async fn select(&self, table: &str, columns: &[String], filter: Option<&Filter>) -> Result<Vec<Record>, StoreError> {
        self.fetch_all(&sql::select(&self.schema, table, columns, filter)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_record(row: &PgRow) -> Record {
    use sqlx::{Column, Row};
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), cell_to_value(row, col.name())))
        .collect()
}

/// Decode one cell by trying the column types account tables use, most specific first.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
