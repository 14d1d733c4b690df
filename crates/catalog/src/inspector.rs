// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog inspector
//!
//! The public entry point. A `CatalogInspector` owns one lazily opened
//! connection and runs every operation as a fetch, combine and render
//! pipeline against it. No other state is kept between calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duckcat_catalog::{CatalogInspector, MetadataRequest, NameFilter, PromptOptions};
//!
//! let inspector = CatalogInspector::new(Some("warehouse.duckdb".into()));
//! let rows = inspector.get_metadata(&MetadataRequest::new().with_schemas(["sales"]))?;
//! let prompt = inspector.build_llm_prompt(
//!     &NameFilter::only(["sales"]),
//!     &NameFilter::any(),
//!     &PromptOptions::default().with_max_tables(20),
//! )?;
//! ```

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::combine::{combine, default_sort_keys};
use crate::config::{InspectorConfig, PromptOptions};
use crate::error::CatalogResult;
use crate::fetch::{EntityFetcher, MetadataRequest, TableRowCount};
use crate::filter::NameFilter;
use crate::format::format_row_counts;
use crate::live_duckdb::DuckDbConnection;
use crate::metadata::{CatalogColumn, CatalogEntity, CatalogRows, DetailLevel, ObjectType};
use crate::prompt::render_prompt;
use crate::provider::ConnectionProvider;
use crate::r#trait::CatalogConnection;

/// Catalog introspection facade
pub struct CatalogInspector<C = DuckDbConnection> {
    provider: ConnectionProvider<C>,
}

impl CatalogInspector<DuckDbConnection> {
    /// Inspect a DuckDB file, or an in-memory database when `None`
    ///
    /// Nothing is opened until the first operation.
    pub fn new(db_file_path: Option<PathBuf>) -> Self {
        Self::from_path(db_file_path)
    }

    /// Inspect a fresh in-memory DuckDB database
    pub fn in_memory() -> Self {
        Self::from_path(None)
    }
}

impl<C: CatalogConnection> CatalogInspector<C> {
    /// Inspector for any connection type, opened lazily from `db_file_path`
    pub fn from_path(db_file_path: Option<PathBuf>) -> Self {
        Self {
            provider: ConnectionProvider::new(db_file_path),
        }
    }

    /// Inspector over an existing connection
    pub fn with_connection(conn: Rc<C>) -> Self {
        Self {
            provider: ConnectionProvider::with_connection(conn),
        }
    }

    /// Validate `config` and build an inspector for its database target
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConfigurationError` if validation fails.
    pub fn from_config(config: &InspectorConfig) -> CatalogResult<Self> {
        config.validate()?;
        Ok(Self::from_path(config.db_file_path.clone()))
    }

    pub fn db_file_path(&self) -> Option<&Path> {
        self.provider.db_file_path()
    }

    /// The shared connection, opened on first use
    pub fn connection(&self) -> CatalogResult<Rc<C>> {
        self.provider.get()
    }

    /// Entity or column rows for tables and, optionally, views
    ///
    /// Pass [`MetadataRequest::entities`] for this operation's defaults
    /// (no constraints).
    #[instrument(skip(self), level = "debug")]
    pub fn get_entities(&self, request: &MetadataRequest) -> CatalogResult<CatalogRows> {
        self.fetch_rows(request)
    }

    /// Same pipeline as [`Self::get_entities`], defaulting to constraints on
    /// via [`MetadataRequest::new`]
    #[instrument(skip(self), level = "debug")]
    pub fn get_metadata(&self, request: &MetadataRequest) -> CatalogResult<CatalogRows> {
        self.fetch_rows(request)
    }

    /// Entity grain rows, typed
    pub fn list_entities(&self, request: &MetadataRequest) -> CatalogResult<Vec<CatalogEntity>> {
        let request = request.clone().with_detail_level(DetailLevel::Table);
        Ok(self
            .fetch_rows(&request)?
            .into_entities()
            .unwrap_or_default())
    }

    /// Column grain rows, typed
    pub fn list_columns(&self, request: &MetadataRequest) -> CatalogResult<Vec<CatalogColumn>> {
        let request = request.clone().with_detail_level(DetailLevel::Column);
        Ok(self
            .fetch_rows(&request)?
            .into_columns()
            .unwrap_or_default())
    }

    fn fetch_rows(&self, request: &MetadataRequest) -> CatalogResult<CatalogRows> {
        let conn = self.connection()?;
        let fetcher = EntityFetcher::new(conn.as_ref());
        let grain = request.detail_level;

        let fetch = |kind| {
            fetcher.fetch(
                kind,
                grain,
                &request.schema_names,
                &request.table_names,
                request.include_constraints,
            )
        };
        let tables = fetch(ObjectType::Table)?;
        let views = if request.include_views {
            Some(fetch(ObjectType::View)?)
        } else {
            None
        };

        let sort_by = default_sort_keys(grain);
        let rows = match tables {
            CatalogRows::Entities(tables) => CatalogRows::Entities(combine(
                tables,
                views.and_then(CatalogRows::into_entities),
                request.include_system_views,
                sort_by,
            )),
            CatalogRows::Columns(tables) => CatalogRows::Columns(combine(
                tables,
                views.and_then(CatalogRows::into_columns),
                request.include_system_views,
                sort_by,
            )),
        };

        debug!(rows = rows.len(), grain = ?grain, "Catalog metadata fetched");
        Ok(rows)
    }

    /// Row-count summary of the non-temporary tables in `schema_names`
    ///
    /// Counts are the catalog's estimates. Returns the `ⓘ no tables found`
    /// line when nothing matches.
    #[instrument(skip(self), level = "debug")]
    pub fn render_row_counts(&self, schema_names: &NameFilter) -> CatalogResult<String> {
        let request = MetadataRequest::entities()
            .with_schemas(schema_names.clone())
            .with_views(false);
        let entities = self.list_entities(&request)?;
        Ok(format_row_counts(&entities, schema_names))
    }

    /// Print the row-count summary to stdout
    pub fn display_row_counts(&self, schema_names: &NameFilter) -> CatalogResult<()> {
        let rendered = self.render_row_counts(schema_names)?;
        debug!(schemas = %schema_names, "\n{}", rendered);
        println!("{}", rendered);
        Ok(())
    }

    /// Exact `COUNT(*)` per base table
    ///
    /// Scans every matching table; prefer [`Self::render_row_counts`] when
    /// estimates are enough.
    #[instrument(skip(self), level = "debug")]
    pub fn exact_row_counts(&self, schema_names: &NameFilter) -> CatalogResult<Vec<TableRowCount>> {
        let conn = self.connection()?;
        EntityFetcher::new(conn.as_ref()).exact_row_counts(schema_names)
    }

    /// Render matching tables and views as an LLM prompt
    ///
    /// # Errors
    ///
    /// Invalid options fail with `CatalogError::ConfigurationError` before
    /// any query is issued.
    #[instrument(skip(self, options), level = "debug")]
    pub fn build_llm_prompt(
        &self,
        schema_names: &NameFilter,
        table_names: &NameFilter,
        options: &PromptOptions,
    ) -> CatalogResult<String> {
        options.validate()?;

        let request = MetadataRequest::new()
            .with_schemas(schema_names.clone())
            .with_tables(table_names.clone())
            .with_constraints(options.include_constraints)
            .with_views(options.include_views)
            .with_system_views(options.include_system_views);
        let columns = self.list_columns(&request)?;
        render_prompt(&columns, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    fn seeded() -> CatalogInspector {
        let conn = DuckDbConnection::in_memory().unwrap();
        conn.execute_batch(
            "CREATE SCHEMA s1;
             CREATE SCHEMA s2;
             CREATE TABLE s1.t1 (id INTEGER PRIMARY KEY, name VARCHAR);
             INSERT INTO s1.t1 VALUES (1, 'a'), (2, 'b'), (3, 'c');
             CREATE TABLE s1.t2 (id INTEGER, value DOUBLE);
             INSERT INTO s1.t2 VALUES (1, 1.5), (2, 2.5);
             CREATE TABLE s2.t3 (id INTEGER, active BOOLEAN);
             INSERT INTO s2.t3 VALUES (1, true), (2, false), (3, true), (4, true), (5, false);
             CREATE VIEW s1.v1 AS SELECT id FROM s1.t1;",
        )
        .unwrap();
        CatalogInspector::with_connection(Rc::new(conn))
    }

    #[test]
    fn test_lazy_connection() {
        let inspector = CatalogInspector::in_memory();
        assert!(inspector.db_file_path().is_none());
        let a = inspector.connection().unwrap();
        let b = inspector.connection().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_schema_filter_entities() {
        let inspector = seeded();
        let request = MetadataRequest::new()
            .with_schemas(["s1"])
            .with_views(false);
        let rows = inspector.list_entities(&request).unwrap();

        let names: Vec<String> = rows.iter().map(CatalogEntity::qualified_name).collect();
        assert_eq!(names, ["s1.t1", "s1.t2"]);
        assert_eq!(rows[0].estimated_size, 3);
        assert_eq!(rows[1].estimated_size, 2);
        assert_eq!(rows[0].pk, Some(vec!["id".to_string()]));
        assert_eq!(rows[1].pk, None);
    }

    #[test]
    fn test_views_at_column_grain() {
        let inspector = seeded();
        let request = MetadataRequest::entities()
            .with_schemas(["s1"])
            .with_tables(["v1"])
            .with_columns(true);
        let columns = inspector.list_columns(&request).unwrap();

        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].object_type, ObjectType::View);
        assert_eq!(columns[0].column_name, "id");
        assert_eq!(columns[0].row_count, 1);
        assert_eq!(columns[0].pk, None);
    }

    #[test]
    fn test_row_counts_tables_only() {
        let inspector = seeded();
        let out = inspector.render_row_counts(&NameFilter::only(["s1"])).unwrap();
        assert!(out.contains("s1.t1"));
        assert!(!out.contains("s1.v1"));
        assert!(!out.contains("s2.t3"));
    }

    #[test]
    fn test_exact_row_counts() {
        let inspector = seeded();
        let counts = inspector.exact_row_counts(&NameFilter::only(["s2"])).unwrap();
        assert_eq!(
            counts,
            vec![TableRowCount {
                table: "s2.t3".to_string(),
                row_count: 5,
            }]
        );
    }

    #[test]
    fn test_prompt_rejects_invalid_options_before_querying() {
        let inspector = CatalogInspector::<DuckDbConnection>::from_path(Some(PathBuf::from(
            "/nonexistent-dir/sub/db.duckdb",
        )));
        let err = inspector
            .build_llm_prompt(
                &NameFilter::any(),
                &NameFilter::any(),
                &PromptOptions::default().with_max_columns(0),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_config_validates() {
        let config = InspectorConfig::new(Some(PathBuf::new()));
        assert!(matches!(
            CatalogInspector::<DuckDbConnection>::from_config(&config),
            Err(CatalogError::ConfigurationError(_))
        ));
    }
}
