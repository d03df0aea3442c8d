//! Builds parameterized INSERT, SELECT, UPDATE, DELETE against one account table.
//! Identifiers come from the schema registry and are always quoted; values are parameters.

use crate::store::{Filter, Record};
use serde_json::Value;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    fn where_clause(&mut self, filter: Option<&Filter>) -> String {
        match filter {
            Some(f) => {
                let n = self.push_param(f.value.clone());
                let mut clause = format!(" WHERE {} = ${}", quoted(&f.column), n);
                if let Some((column, value)) = &f.exclude {
                    let n = self.push_param(value.clone());
                    clause.push_str(&format!(" AND {} IS DISTINCT FROM ${}", quoted(column), n));
                }
                clause
            }
            None => String::new(),
        }
    }
}

/// INSERT one record, returning the stored row.
pub fn insert(schema: &str, table: &str, record: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, table);
    if record.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table);
        return q;
    }
    let mut cols = Vec::with_capacity(record.len());
    let mut placeholders = Vec::with_capacity(record.len());
    for (name, value) in record {
        let n = q.push_param(value.clone());
        cols.push(quoted(name));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE rows matching `filter`: SET only the columns present in `patch`.
pub fn update(schema: &str, table: &str, patch: &Record, filter: &Filter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, table);
    let sets: Vec<String> = patch
        .iter()
        .map(|(k, v)| {
            let n = q.push_param(v.clone());
            format!("{} = ${}", quoted(k), n)
        })
        .collect();
    let where_clause = q.where_clause(Some(filter));
    q.sql = format!("UPDATE {} SET {}{} RETURNING *", table, sets.join(", "), where_clause);
    q
}

/// DELETE rows matching `filter`.
pub fn delete(schema: &str, table: &str, filter: &Filter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, table);
    let where_clause = q.where_clause(Some(filter));
    q.sql = format!("DELETE FROM {}{} RETURNING *", table, where_clause);
    q
}

/// SELECT the given columns (all when empty), optionally filtered by one column.
pub fn select(schema: &str, table: &str, columns: &[String], filter: Option<&Filter>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, table);
    let cols = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
    };
    let where_clause = q.where_clause(filter);
    q.sql = format!("SELECT {} FROM {}{}", cols, table, where_clause);
    q
}
