// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Connection trait for the SQL engine boundary
//!
//! This module defines the blocking `CatalogConnection` trait through which
//! every catalog query is issued.

use std::path::Path;

use crate::error::CatalogResult;
use crate::metadata::Row;

/// Connection to the embedded SQL engine
///
/// The catalog layer only needs two capabilities: opening a database
/// (file-backed or in-memory) and running a parameterized statement that
/// returns positional rows. Calls block until the engine answers; there is
/// no timeout or cancellation.
///
/// Implementations are not required to be thread-safe. A connection shared
/// between workers must be serialized by the caller.
///
/// # Examples
///
/// ```rust,ignore
/// use duckcat_catalog::{CatalogConnection, DuckDbConnection};
///
/// let conn = DuckDbConnection::open(None)?;
/// let rows = conn.query("SELECT ?::VARCHAR", &["main".to_string()])?;
/// assert_eq!(rows.len(), 1);
/// ```
pub trait CatalogConnection {
    /// Open a connection
    ///
    /// # Arguments
    ///
    /// * `db_file_path` - Database file, or `None` for a transient in-memory database
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConnectionFailed` if the engine cannot open the target.
    fn open(db_file_path: Option<&Path>) -> CatalogResult<Self>
    where
        Self: Sized;

    /// Execute a statement with positional `?` parameters
    ///
    /// Parameters are always bound, never interpolated into `sql`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::QueryFailed` if the engine rejects the statement.
    fn query(&self, sql: &str, params: &[String]) -> CatalogResult<Vec<Row>>;
}
