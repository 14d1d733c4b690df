// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock connection implementation for testing
//!
//! Answers catalog queries from scripted rows and records every statement,
//! so fetcher tests can assert SQL shape and bound parameters without an
//! engine.

use std::cell::RefCell;
use std::path::Path;

use duckcat_catalog::{
    CatalogColumn, CatalogConnection, CatalogEntity, CatalogError, CatalogResult, ObjectType,
    PrimaryKeySet, Row, Value,
};

/// One statement seen by a [`MockConnection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// Scripted catalog connection
///
/// A query is answered by the most recently registered response whose
/// pattern occurs in the SQL text, so a later `fail` overrides an earlier
/// `respond` for the same statement. Unmatched queries return no rows. Filters are not applied: the
/// scripted rows come back as-is.
#[derive(Debug, Default)]
pub struct MockConnection {
    responses: Vec<(String, CatalogResult<Vec<Row>>)>,
    queries: RefCell<Vec<RecordedQuery>>,
}

impl MockConnection {
    /// Create a connection that answers every query with no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries containing `pattern` with `rows`
    pub fn respond(mut self, pattern: impl Into<String>, rows: Vec<Row>) -> Self {
        self.responses.push((pattern.into(), Ok(rows)));
        self
    }

    /// Fail queries containing `pattern` with `error`
    pub fn fail(mut self, pattern: impl Into<String>, error: CatalogError) -> Self {
        self.responses.push((pattern.into(), Err(error)));
        self
    }

    /// Every statement issued so far, in order
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.borrow().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }

    /// Statements whose SQL contains `pattern`
    pub fn queries_matching(&self, pattern: &str) -> Vec<RecordedQuery> {
        self.queries
            .borrow()
            .iter()
            .filter(|q| q.sql.contains(pattern))
            .cloned()
            .collect()
    }
}

impl CatalogConnection for MockConnection {
    fn open(_db_file_path: Option<&Path>) -> CatalogResult<Self> {
        Ok(Self::new())
    }

    fn query(&self, sql: &str, params: &[String]) -> CatalogResult<Vec<Row>> {
        self.queries.borrow_mut().push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        self.responses
            .iter()
            .rev()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Distinguishing fragments of each catalog statement
pub mod patterns {
    pub const TABLE_ENTITIES: &str = "FROM duckdb_tables()\n";
    pub const VIEW_ENTITIES: &str = "FROM duckdb_views()\n";
    pub const TABLE_COLUMNS: &str = "FROM duckdb_tables() t";
    pub const VIEW_COLUMNS: &str = "FROM duckdb_views() v";
    pub const PRIMARY_KEYS: &str = "duckdb_constraints()";
    pub const BASE_TABLES: &str = "information_schema.tables";
}

fn count(value: u64) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Positional row in the layout of the entity query
pub fn entity_row(entity: &CatalogEntity) -> Row {
    Row::new(vec![
        Value::from(entity.schema_name.as_str()),
        Value::from(entity.table_name.as_str()),
        Value::from(entity.object_type.as_str()),
        count(entity.estimated_size),
        Value::from(entity.temporary),
        Value::from(entity.comment.clone()),
    ])
}

/// Positional row in the layout of the column query
pub fn column_row(column: &CatalogColumn) -> Row {
    Row::new(vec![
        Value::from(column.schema_name.as_str()),
        Value::from(column.table_name.as_str()),
        Value::from(column.object_type.as_str()),
        count(column.row_count),
        Value::from(column.table_comment.clone()),
        Value::from(column.temporary),
        Value::from(column.column_index),
        Value::from(column.column_name.as_str()),
        Value::from(column.data_type.as_str()),
        Value::from(column.comment.clone()),
        Value::from(column.column_default.clone()),
        Value::from(column.has_default),
        Value::from(column.is_nullable),
    ])
}

/// Positional row in the layout of the primary key query
pub fn pk_row(set: &PrimaryKeySet) -> Row {
    Row::new(vec![
        Value::from(set.schema_name.as_str()),
        Value::from(set.table_name.as_str()),
        Value::from(set.pk.clone()),
    ])
}

/// Builder for creating mock connections with a fluent API
pub struct MockConnectionBuilder {
    conn: MockConnection,
}

impl Default for MockConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnectionBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            conn: MockConnection::new(),
        }
    }

    /// Script the table entity query
    pub fn with_tables(mut self, tables: &[CatalogEntity]) -> Self {
        self.conn = self
            .conn
            .respond(patterns::TABLE_ENTITIES, tables.iter().map(entity_row).collect());
        self
    }

    /// Script the view entity query
    pub fn with_views(mut self, views: &[CatalogEntity]) -> Self {
        self.conn = self
            .conn
            .respond(patterns::VIEW_ENTITIES, views.iter().map(entity_row).collect());
        self
    }

    /// Script the table column query
    pub fn with_table_columns(mut self, columns: &[CatalogColumn]) -> Self {
        self.conn = self
            .conn
            .respond(patterns::TABLE_COLUMNS, columns.iter().map(column_row).collect());
        self
    }

    /// Script the view column query
    pub fn with_view_columns(mut self, columns: &[CatalogColumn]) -> Self {
        self.conn = self
            .conn
            .respond(patterns::VIEW_COLUMNS, columns.iter().map(column_row).collect());
        self
    }

    /// Script the primary key query
    pub fn with_primary_keys(mut self, keys: &[PrimaryKeySet]) -> Self {
        self.conn = self
            .conn
            .respond(patterns::PRIMARY_KEYS, keys.iter().map(pk_row).collect());
        self
    }

    /// Fail every statement containing `pattern`
    pub fn failing_on(mut self, pattern: &str, error: CatalogError) -> Self {
        self.conn = self.conn.fail(pattern, error);
        self
    }

    /// Add the standard test schema
    ///
    /// `shop.users` (keyed by `id`, 3 rows) and `shop.orders` (4 rows), a
    /// user view `shop.user_summary`, and one system view in `main`.
    pub fn with_standard_schema(self) -> Self {
        let users = [
            CatalogColumn::new("shop", "users", 1, "id", "INTEGER")
                .with_row_count(3)
                .with_table_comment("User accounts")
                .with_nullable(false),
            CatalogColumn::new("shop", "users", 2, "name", "VARCHAR").with_row_count(3),
            CatalogColumn::new("shop", "users", 3, "email", "VARCHAR")
                .with_row_count(3)
                .with_comment("Login address"),
        ];
        let orders = [
            CatalogColumn::new("shop", "orders", 1, "id", "INTEGER").with_row_count(4),
            CatalogColumn::new("shop", "orders", 2, "user_id", "INTEGER").with_row_count(4),
            CatalogColumn::new("shop", "orders", 3, "amount", "DECIMAL(10,2)")
                .with_row_count(4)
                .with_default("0"),
        ];
        let summary = [
            CatalogColumn::new("shop", "user_summary", 1, "id", "INTEGER")
                .with_object_type(ObjectType::View)
                .with_row_count(2),
            CatalogColumn::new("shop", "user_summary", 2, "name", "VARCHAR")
                .with_object_type(ObjectType::View)
                .with_row_count(2),
        ];
        let table_columns: Vec<CatalogColumn> = orders.iter().chain(users.iter()).cloned().collect();

        self.with_tables(&[
            CatalogEntity::new("shop", "orders", ObjectType::Table)
                .with_estimated_size(4),
            CatalogEntity::new("shop", "users", ObjectType::Table)
                .with_estimated_size(3)
                .with_comment("User accounts"),
        ])
        .with_views(&[
            CatalogEntity::new("main", "duckdb_tables", ObjectType::View).with_estimated_size(16),
            CatalogEntity::new("shop", "user_summary", ObjectType::View).with_estimated_size(2),
        ])
        .with_table_columns(&table_columns)
        .with_view_columns(&summary)
        .with_primary_keys(&[PrimaryKeySet::new("shop", "users", ["id"])])
    }

    /// Build the connection
    pub fn build(self) -> MockConnection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_matching_response_wins() {
        let conn = MockConnection::new()
            .respond("duckdb", vec![])
            .respond("duckdb_tables()", vec![Row::new(vec![Value::from(1_i64)])]);
        assert_eq!(conn.query("SELECT * FROM duckdb_tables()", &[]).unwrap().len(), 1);
        assert!(conn.query("SELECT * FROM duckdb_views()", &[]).unwrap().is_empty());
        assert!(conn.query("SELECT 1", &[]).unwrap().is_empty());
        assert_eq!(conn.query_count(), 3);
    }

    #[test]
    fn test_records_params_and_failures() {
        let conn = MockConnection::new().fail("boom", CatalogError::QueryFailed("boom".into()));
        assert!(conn.query("SELECT boom", &["a".to_string()]).is_err());
        assert_eq!(conn.queries()[0].params, vec!["a".to_string()]);
        assert_eq!(conn.queries_matching("boom").len(), 1);
    }

    #[test]
    fn test_failure_overrides_scripted_rows() {
        let error = CatalogError::QueryFailed("Catalog Error: no such function".into());
        let conn = MockConnectionBuilder::new()
            .with_standard_schema()
            .failing_on(patterns::VIEW_ENTITIES, error.clone())
            .build();

        let sql = "SELECT * FROM duckdb_views()\nORDER BY schema_name";
        assert_eq!(conn.query(sql, &[]), Err(error));
        let sql = "SELECT * FROM duckdb_tables()\nORDER BY schema_name";
        assert_eq!(conn.query(sql, &[]).map(|rows| rows.len()), Ok(2));
    }

    #[test]
    fn test_column_row_layout() {
        let column = CatalogColumn::new("s", "t", 1, "id", "INTEGER").with_row_count(3);
        let row = column_row(&column);
        assert_eq!(row.len(), 13);
        assert_eq!(row.get(3), Some(&Value::Integer(3)));
        assert_eq!(row.get(12), Some(&Value::Boolean(true)));
    }
}
