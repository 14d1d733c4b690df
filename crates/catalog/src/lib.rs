// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # duckcat - Catalog Layer
//!
//! This crate introspects an embedded DuckDB catalog and turns it into typed
//! records, row-count summaries and LLM prompts.
//!
//! ## Architecture
//!
//! Every operation is a blocking fetch, combine and render pipeline:
//! - **Filters** ([`NameFilter`], [`build_where`]): caller name lists become
//!   bound `IN (?, ...)` predicates; absent and empty filters are the same
//! - **Fetcher** ([`EntityFetcher`]): tables and views at entity or column
//!   grain, with primary keys merged on request
//! - **Combiner** ([`combine`]): union, system-view filtering, stable sort
//! - **Renderers** ([`format_row_counts`], [`render_prompt`])
//! - **Facade** ([`CatalogInspector`]): owns the lazily opened connection
//!
//! ## Metadata Types
//!
//! - [`CatalogEntity`]: one table or view
//! - [`CatalogColumn`]: one column with its parent's fields denormalized
//! - [`PrimaryKeySet`]: ordered key columns of one table
//! - [`CatalogRows`]: a rowset tagged with its grain
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duckcat_catalog::{CatalogInspector, NameFilter};
//!
//! let inspector = CatalogInspector::new(Some("warehouse.duckdb".into()));
//! inspector.display_row_counts(&NameFilter::only(["sales"]))?;
//! ```
//!
//! ## Implementing CatalogConnection
//!
//! Any engine that can answer the DuckDB catalog functions can back an
//! inspector:
//!
//! ```rust,ignore
//! use duckcat_catalog::{CatalogConnection, CatalogInspector, CatalogResult, Row};
//!
//! struct MyConnection;
//!
//! impl CatalogConnection for MyConnection {
//!     fn open(db_file_path: Option<&Path>) -> CatalogResult<Self> {
//!         // Your implementation here
//!     }
//!
//!     fn query(&self, sql: &str, params: &[String]) -> CatalogResult<Vec<Row>> {
//!         // Your implementation here
//!     }
//! }
//!
//! let inspector = CatalogInspector::<MyConnection>::from_path(None);
//! ```

pub mod combine;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod format;
pub mod inspector;
pub mod live_duckdb;
pub mod metadata;
pub mod prompt;
pub mod provider;
pub mod r#trait;

// Re-exports
pub use combine::{combine, default_sort_keys, filter_system_views, is_system_view, SYSTEM_SCHEMAS};
pub use config::{ConfigError, InspectorConfig, PromptFormat, PromptOptions};
pub use error::{CatalogError, CatalogResult};
pub use fetch::{EntityFetcher, MetadataRequest, TableRowCount};
pub use filter::{build_where, entity_conditions, name_column, quote_identifier, NameFilter, WhereClause};
pub use format::{format_row_counts, group_thousands};
pub use inspector::CatalogInspector;
pub use live_duckdb::DuckDbConnection;
pub use metadata::{
    compare_by, CatalogColumn, CatalogEntity, CatalogRecord, CatalogRows, DetailLevel,
    ObjectType, PrimaryKeySet, Row, SortKey, Value,
};
pub use prompt::{render_prompt, DEFAULT_PROMPT_PREFIX};
pub use provider::{ConnectionProvider, ConnectionRegistry};
pub use r#trait::CatalogConnection;
