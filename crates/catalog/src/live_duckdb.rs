// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live DuckDB connection
//!
//! This module provides the `CatalogConnection` implementation backed by an
//! embedded DuckDB database, either file-backed or in-memory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duckcat_catalog::{CatalogConnection, DuckDbConnection};
//!
//! let conn = DuckDbConnection::open(Some(Path::new("warehouse.duckdb")))?;
//! let rows = conn.query("SELECT schema_name FROM duckdb_schemas()", &[])?;
//! ```

use std::path::{Path, PathBuf};

use duckdb::types::Value as DuckValue;
use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{Row, Value};
use crate::r#trait::CatalogConnection;

/// Live DuckDB connection
///
/// Wraps a single `duckdb::Connection`. The connection is closed when the
/// last owner drops it.
pub struct DuckDbConnection {
    conn: duckdb::Connection,
    /// Backing file, `None` for in-memory databases
    db_file_path: Option<PathBuf>,
}

impl DuckDbConnection {
    /// Wrap an already opened DuckDB connection
    pub fn from_connection(conn: duckdb::Connection) -> Self {
        Self {
            conn,
            db_file_path: None,
        }
    }

    /// Open a transient in-memory database
    pub fn in_memory() -> CatalogResult<Self> {
        Self::open(None)
    }

    /// Backing file path, if file-backed
    pub fn db_file_path(&self) -> Option<&Path> {
        self.db_file_path.as_deref()
    }

    /// Borrow the underlying DuckDB connection
    pub fn inner(&self) -> &duckdb::Connection {
        &self.conn
    }

    /// Run one or more statements without results (DDL, inserts)
    pub fn execute_batch(&self, sql: &str) -> CatalogResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| CatalogError::QueryFailed(e.to_string()))
    }

    /// Convert a DuckDB cell into a boundary value
    ///
    /// Integers of every width collapse to `Integer`; values outside `i64`
    /// and types the catalog never selects are kept as their debug text.
    fn convert_value(value: DuckValue) -> Value {
        match value {
            DuckValue::Null => Value::Null,
            DuckValue::Boolean(v) => Value::Boolean(v),
            DuckValue::TinyInt(v) => Value::Integer(i64::from(v)),
            DuckValue::SmallInt(v) => Value::Integer(i64::from(v)),
            DuckValue::Int(v) => Value::Integer(i64::from(v)),
            DuckValue::BigInt(v) => Value::Integer(v),
            DuckValue::UTinyInt(v) => Value::Integer(i64::from(v)),
            DuckValue::USmallInt(v) => Value::Integer(i64::from(v)),
            DuckValue::UInt(v) => Value::Integer(i64::from(v)),
            DuckValue::UBigInt(v) => {
                i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Integer)
            }
            DuckValue::HugeInt(v) => {
                i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Integer)
            }
            DuckValue::Text(s) | DuckValue::Enum(s) => Value::Text(s),
            DuckValue::List(items) => {
                Value::List(items.into_iter().map(Self::convert_value).collect())
            }
            other => Value::Text(format!("{:?}", other)),
        }
    }
}

impl CatalogConnection for DuckDbConnection {
    fn open(db_file_path: Option<&Path>) -> CatalogResult<Self> {
        let conn = match db_file_path {
            Some(path) => {
                info!(path = %path.display(), "Opening DuckDB database file");
                duckdb::Connection::open(path)
            }
            None => {
                info!("Opening in-memory DuckDB database");
                duckdb::Connection::open_in_memory()
            }
        }
        .map_err(|e| {
            CatalogError::ConnectionFailed(match db_file_path {
                Some(path) => format!("{}: {}", path.display(), e),
                None => e.to_string(),
            })
        })?;

        Ok(Self {
            conn,
            db_file_path: db_file_path.map(Path::to_path_buf),
        })
    }

    fn query(&self, sql: &str, params: &[String]) -> CatalogResult<Vec<Row>> {
        debug!(params = params.len(), "Executing catalog query");

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| CatalogError::QueryFailed(format!("Failed to prepare query: {}", e)))?;

        let mut rows = stmt
            .query(duckdb::params_from_iter(params.iter()))
            .map_err(|e| CatalogError::QueryFailed(e.to_string()))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| CatalogError::QueryFailed(e.to_string()))?
        {
            let width = row.as_ref().column_count();
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value: DuckValue = row
                    .get(idx)
                    .map_err(|e| CatalogError::QueryFailed(e.to_string()))?;
                values.push(Self::convert_value(value));
            }
            out.push(Row::new(values));
        }

        Ok(out)
    }
}
