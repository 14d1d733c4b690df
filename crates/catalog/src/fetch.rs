// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Entity metadata fetcher
//!
//! Issues the catalog queries for tables and views, at entity or column
//! grain, and decodes the positional rows into typed records. Tables and
//! views are fetched independently and normalized into the same shape so the
//! combiner can union them.
//!
//! Catalog relations used:
//! - `duckdb_tables()` / `duckdb_views()` for entities
//! - `duckdb_columns()` joined with `information_schema.columns` for columns
//! - `duckdb_constraints()` for primary keys
//!
//! Views have no cardinality in the catalog; their `estimated_size` (and the
//! denormalized `row_count` on their columns) is the declared column count.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::{build_where, entity_conditions, quote_identifier, NameFilter};
use crate::metadata::{
    CatalogColumn, CatalogEntity, CatalogRows, DetailLevel, ObjectType, PrimaryKeySet, Row, Value,
};
use crate::r#trait::CatalogConnection;

const TABLE_ENTITY_SQL: &str = "
SELECT
    schema_name,
    table_name,
    'table' AS object_type,
    estimated_size,
    temporary,
    comment
FROM duckdb_tables()
{where}
ORDER BY schema_name, table_name";

const VIEW_ENTITY_SQL: &str = "
SELECT
    schema_name,
    view_name AS table_name,
    'view' AS object_type,
    column_count AS estimated_size,
    temporary,
    comment
FROM duckdb_views()
{where}
ORDER BY schema_name, view_name";

const TABLE_COLUMN_SQL: &str = "
SELECT
    t.schema_name,
    t.table_name,
    'table' AS object_type,
    t.estimated_size AS row_count,
    t.comment AS table_comment,
    t.temporary,
    c.column_index,
    c.column_name,
    c.data_type,
    c.comment,
    COALESCE(isc.column_default, c.column_default) AS column_default,
    COALESCE(isc.column_default, c.column_default) IS NOT NULL AS has_default,
    COALESCE(isc.is_nullable = 'YES', c.is_nullable) AS is_nullable
FROM duckdb_tables() t
JOIN duckdb_columns() c
    ON c.database_name = t.database_name
   AND c.schema_name = t.schema_name
   AND c.table_name = t.table_name
LEFT JOIN information_schema.columns isc
    ON isc.table_catalog = t.database_name
   AND isc.table_schema = t.schema_name
   AND isc.table_name = t.table_name
   AND isc.column_name = c.column_name
{where}
ORDER BY t.schema_name, t.table_name, c.column_index";

const VIEW_COLUMN_SQL: &str = "
SELECT
    v.schema_name,
    v.view_name AS table_name,
    'view' AS object_type,
    v.column_count AS row_count,
    v.comment AS table_comment,
    v.temporary,
    c.column_index,
    c.column_name,
    c.data_type,
    c.comment,
    COALESCE(isc.column_default, c.column_default) AS column_default,
    COALESCE(isc.column_default, c.column_default) IS NOT NULL AS has_default,
    COALESCE(isc.is_nullable = 'YES', c.is_nullable) AS is_nullable
FROM duckdb_views() v
JOIN duckdb_columns() c
    ON c.database_name = v.database_name
   AND c.schema_name = v.schema_name
   AND c.table_name = v.view_name
LEFT JOIN information_schema.columns isc
    ON isc.table_catalog = v.database_name
   AND isc.table_schema = v.schema_name
   AND isc.table_name = v.view_name
   AND isc.column_name = c.column_name
{where}
ORDER BY v.schema_name, v.view_name, c.column_index";

const PRIMARY_KEY_SQL: &str = "
SELECT schema_name, table_name, constraint_column_names
FROM (
    SELECT schema_name, table_name, constraint_column_names
    FROM duckdb_constraints()
    WHERE constraint_type = 'PRIMARY KEY'
) pk
{where}
ORDER BY schema_name, table_name";

const BASE_TABLES_SQL: &str = "
SELECT table_schema, table_name
FROM (
    SELECT table_schema AS schema_name, table_schema, table_name
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
) bt
{where}
ORDER BY table_schema, table_name";

/// Metadata fetch request
///
/// Two sets of defaults exist: [`MetadataRequest::new`] (constraints on) and
/// [`MetadataRequest::entities`] (constraints off). Both fetch at table grain
/// and include views and system views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRequest {
    pub schema_names: NameFilter,
    pub table_names: NameFilter,
    pub detail_level: DetailLevel,
    pub include_constraints: bool,
    pub include_views: bool,
    pub include_system_views: bool,
}

impl Default for MetadataRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataRequest {
    pub fn new() -> Self {
        Self {
            schema_names: NameFilter::any(),
            table_names: NameFilter::any(),
            detail_level: DetailLevel::Table,
            include_constraints: true,
            include_views: true,
            include_system_views: true,
        }
    }

    pub fn entities() -> Self {
        Self {
            include_constraints: false,
            ..Self::new()
        }
    }

    /// Builder method: filter by schema
    pub fn with_schemas(mut self, schema_names: impl Into<NameFilter>) -> Self {
        self.schema_names = schema_names.into();
        self
    }

    /// Builder method: filter by table or view name
    pub fn with_tables(mut self, table_names: impl Into<NameFilter>) -> Self {
        self.table_names = table_names.into();
        self
    }

    /// Builder method: set detail level
    pub fn with_detail_level(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }

    /// Builder method: column grain on or off
    pub fn with_columns(self, include_columns: bool) -> Self {
        self.with_detail_level(if include_columns {
            DetailLevel::Column
        } else {
            DetailLevel::Table
        })
    }

    /// Builder method: merge primary keys
    pub fn with_constraints(mut self, include_constraints: bool) -> Self {
        self.include_constraints = include_constraints;
        self
    }

    /// Builder method: include views
    pub fn with_views(mut self, include_views: bool) -> Self {
        self.include_views = include_views;
        self
    }

    /// Builder method: include views in system schemas
    pub fn with_system_views(mut self, include_system_views: bool) -> Self {
        self.include_system_views = include_system_views;
        self
    }
}

/// Exact row count of one base table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowCount {
    /// `schema.table`
    pub table: String,
    pub row_count: u64,
}

/// Catalog query issuer bound to one connection
pub struct EntityFetcher<'c, C> {
    conn: &'c C,
}

impl<'c, C: CatalogConnection> EntityFetcher<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Fetch one kind of entity at the requested grain
    ///
    /// Primary keys are merged onto tables when `include_constraints` is set;
    /// views always carry `pk = None`.
    pub fn fetch(
        &self,
        kind: ObjectType,
        detail_level: DetailLevel,
        schema_names: &NameFilter,
        table_names: &NameFilter,
        include_constraints: bool,
    ) -> CatalogResult<CatalogRows> {
        let keys = if include_constraints && kind == ObjectType::Table {
            Some(self.primary_key_map(schema_names, table_names)?)
        } else {
            None
        };
        let lookup = |schema: &str, table: &str| -> Option<Vec<String>> {
            keys.as_ref()?
                .get(&(schema.to_string(), table.to_string()))
                .cloned()
        };

        match detail_level {
            DetailLevel::Table => {
                let mut rows = self.fetch_entities(kind, schema_names, table_names)?;
                for row in &mut rows {
                    row.pk = lookup(&row.schema_name, &row.table_name);
                }
                Ok(CatalogRows::Entities(rows))
            }
            DetailLevel::Column => {
                let mut rows = self.fetch_columns(kind, schema_names, table_names)?;
                for row in &mut rows {
                    row.pk = lookup(&row.schema_name, &row.table_name);
                }
                Ok(CatalogRows::Columns(rows))
            }
        }
    }

    /// One row per table or view
    pub fn fetch_entities(
        &self,
        kind: ObjectType,
        schema_names: &NameFilter,
        table_names: &NameFilter,
    ) -> CatalogResult<Vec<CatalogEntity>> {
        let template = match kind {
            ObjectType::Table => TABLE_ENTITY_SQL,
            ObjectType::View => VIEW_ENTITY_SQL,
        };
        let conditions = entity_conditions(kind, schema_names, table_names);
        let filter = build_where(conditions, None);
        let sql = template.replace("{where}", &filter.clause);

        let rows = self.run(&sql, &filter.params, kind, "entities")?;
        rows.iter().map(decode_entity).collect()
    }

    /// One row per column, ordered by schema, table and column index
    pub fn fetch_columns(
        &self,
        kind: ObjectType,
        schema_names: &NameFilter,
        table_names: &NameFilter,
    ) -> CatalogResult<Vec<CatalogColumn>> {
        let (template, alias) = match kind {
            ObjectType::Table => (TABLE_COLUMN_SQL, "t"),
            ObjectType::View => (VIEW_COLUMN_SQL, "v"),
        };
        let conditions = entity_conditions(kind, schema_names, table_names);
        let filter = build_where(conditions, Some(alias));
        let sql = template.replace("{where}", &filter.clause);

        let rows = self.run(&sql, &filter.params, kind, "columns")?;
        rows.iter().map(decode_column).collect()
    }

    /// Primary keys of the matching tables
    pub fn fetch_primary_keys(
        &self,
        schema_names: &NameFilter,
        table_names: &NameFilter,
    ) -> CatalogResult<Vec<PrimaryKeySet>> {
        let conditions = entity_conditions(ObjectType::Table, schema_names, table_names);
        let filter = build_where(conditions, None);
        let sql = PRIMARY_KEY_SQL.replace("{where}", &filter.clause);

        let rows = self.run(&sql, &filter.params, ObjectType::Table, "primary keys")?;
        rows.iter()
            .map(|row| {
                let reader = RowReader::new(row);
                Ok(PrimaryKeySet {
                    schema_name: reader.text(0, "schema_name")?,
                    table_name: reader.text(1, "table_name")?,
                    pk: reader.text_list(2, "constraint_column_names")?,
                })
            })
            .collect()
    }

    fn primary_key_map(
        &self,
        schema_names: &NameFilter,
        table_names: &NameFilter,
    ) -> CatalogResult<HashMap<(String, String), Vec<String>>> {
        Ok(self
            .fetch_primary_keys(schema_names, table_names)?
            .into_iter()
            .map(|set| ((set.schema_name, set.table_name), set.pk))
            .collect())
    }

    /// Count the rows of every base table with `COUNT(*)`
    ///
    /// Table identifiers come from `information_schema.tables` and are quoted
    /// before being placed in the statement text.
    pub fn exact_row_counts(&self, schema_names: &NameFilter) -> CatalogResult<Vec<TableRowCount>> {
        let filter = build_where([("schema_name", schema_names.values())], None);
        let sql = BASE_TABLES_SQL.replace("{where}", &filter.clause);
        let tables = self.run(&sql, &filter.params, ObjectType::Table, "base tables")?;

        let mut counts = Vec::with_capacity(tables.len());
        for row in &tables {
            let reader = RowReader::new(row);
            let schema = reader.text(0, "table_schema")?;
            let table = reader.text(1, "table_name")?;

            let sql = format!(
                "SELECT COUNT(*) FROM {}.{}",
                quote_identifier(&schema),
                quote_identifier(&table)
            );
            let result = self.conn.query(&sql, &[])?;
            let row_count = match result.first() {
                Some(row) => RowReader::new(row).count(0, "count")?,
                None => 0,
            };

            counts.push(TableRowCount {
                table: format!("{}.{}", schema, table),
                row_count,
            });
        }
        Ok(counts)
    }

    fn run(
        &self,
        sql: &str,
        params: &[String],
        kind: ObjectType,
        what: &str,
    ) -> CatalogResult<Vec<Row>> {
        debug!(kind = %kind, what, params = params.len(), "Fetching catalog metadata");
        let rows = self.conn.query(sql, params)?;
        if rows.is_empty() {
            debug!(kind = %kind, what, "Catalog query returned no rows");
        }
        Ok(rows)
    }
}

fn decode_entity(row: &Row) -> CatalogResult<CatalogEntity> {
    let reader = RowReader::new(row);
    Ok(CatalogEntity {
        schema_name: reader.text(0, "schema_name")?,
        table_name: reader.text(1, "table_name")?,
        object_type: reader.object_type(2)?,
        estimated_size: reader.count(3, "estimated_size")?,
        temporary: reader.flag(4, "temporary")?,
        comment: reader.opt_text(5, "comment")?,
        pk: None,
    })
}

fn decode_column(row: &Row) -> CatalogResult<CatalogColumn> {
    let reader = RowReader::new(row);
    Ok(CatalogColumn {
        schema_name: reader.text(0, "schema_name")?,
        table_name: reader.text(1, "table_name")?,
        object_type: reader.object_type(2)?,
        row_count: reader.count(3, "row_count")?,
        table_comment: reader.opt_text(4, "table_comment")?,
        temporary: reader.flag(5, "temporary")?,
        column_index: reader.int(6, "column_index")?,
        column_name: reader.text(7, "column_name")?,
        data_type: reader.text(8, "data_type")?,
        comment: reader.opt_text(9, "comment")?,
        column_default: reader.opt_text(10, "column_default")?,
        has_default: reader.flag(11, "has_default")?,
        is_nullable: reader.flag(12, "is_nullable")?,
        pk: None,
    })
}

/// Positional decoder with column names for error messages
struct RowReader<'r> {
    row: &'r Row,
}

impl<'r> RowReader<'r> {
    fn new(row: &'r Row) -> Self {
        Self { row }
    }

    fn cell(&self, idx: usize) -> &'r Value {
        self.row.get(idx).unwrap_or(&Value::Null)
    }

    fn unexpected(&self, idx: usize, column: &str, expected: &str) -> CatalogError {
        CatalogError::UnexpectedValue {
            column: column.to_string(),
            expected: expected.to_string(),
            found: self.cell(idx).kind().to_string(),
        }
    }

    fn text(&self, idx: usize, column: &str) -> CatalogResult<String> {
        self.cell(idx)
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.unexpected(idx, column, "text"))
    }

    fn opt_text(&self, idx: usize, column: &str) -> CatalogResult<Option<String>> {
        match self.cell(idx) {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            _ => Err(self.unexpected(idx, column, "text or null")),
        }
    }

    fn int(&self, idx: usize, column: &str) -> CatalogResult<i64> {
        self.cell(idx)
            .as_i64()
            .ok_or_else(|| self.unexpected(idx, column, "integer"))
    }

    /// Non-negative integer; a null count reads as zero
    fn count(&self, idx: usize, column: &str) -> CatalogResult<u64> {
        match self.cell(idx) {
            Value::Null => Ok(0),
            Value::Integer(v) => u64::try_from(*v)
                .map_err(|_| self.unexpected(idx, column, "non-negative integer")),
            _ => Err(self.unexpected(idx, column, "integer")),
        }
    }

    /// Boolean; null reads as false
    fn flag(&self, idx: usize, column: &str) -> CatalogResult<bool> {
        match self.cell(idx) {
            Value::Null => Ok(false),
            Value::Boolean(v) => Ok(*v),
            _ => Err(self.unexpected(idx, column, "boolean")),
        }
    }

    fn text_list(&self, idx: usize, column: &str) -> CatalogResult<Vec<String>> {
        self.cell(idx)
            .as_string_list()
            .ok_or_else(|| self.unexpected(idx, column, "list of text"))
    }

    fn object_type(&self, idx: usize) -> CatalogResult<ObjectType> {
        let tag = self.text(idx, "object_type")?;
        tag.parse()
            .map_err(|_| self.unexpected(idx, "object_type", "'table' or 'view'"))
    }
}
