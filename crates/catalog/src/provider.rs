// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Connection provider and registry
//!
//! This module manages connection lifetimes for catalog inspection.
//!
//! - [`ConnectionProvider`] lazily opens one connection on first use and hands
//!   out the same instance afterwards, unless one was injected up front.
//! - [`ConnectionRegistry`] is an explicit, caller-owned map that reuses
//!   connections across several inspectors pointed at the same target.
//!
//! Sharing is single-threaded (`Rc`); the engine connection is closed when
//! the last owner is dropped.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::error::CatalogResult;
use crate::r#trait::CatalogConnection;

/// Lazily initialized connection holder
pub struct ConnectionProvider<C> {
    db_file_path: Option<PathBuf>,
    conn: OnceCell<Rc<C>>,
}

impl<C: CatalogConnection> ConnectionProvider<C> {
    /// Create a provider that opens `db_file_path` (or an in-memory database) on first use
    pub fn new(db_file_path: Option<PathBuf>) -> Self {
        Self {
            db_file_path,
            conn: OnceCell::new(),
        }
    }

    /// Create a provider around an existing connection; nothing is opened
    pub fn with_connection(conn: Rc<C>) -> Self {
        Self {
            db_file_path: None,
            conn: OnceCell::from(conn),
        }
    }

    pub fn db_file_path(&self) -> Option<&Path> {
        self.db_file_path.as_deref()
    }

    /// Whether the connection has been created or injected
    pub fn is_initialized(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Get the connection, opening it on the first call
    ///
    /// # Errors
    ///
    /// Propagates the engine's open failure unchanged. A failed open leaves
    /// the provider uninitialized.
    pub fn get(&self) -> CatalogResult<Rc<C>> {
        if let Some(conn) = self.conn.get() {
            return Ok(Rc::clone(conn));
        }

        let conn = Rc::new(C::open(self.db_file_path.as_deref())?);
        // Cannot already be set: the provider is not shared across threads
        // and `open` does not re-enter it.
        let _ = self.conn.set(Rc::clone(&conn));
        Ok(conn)
    }
}

/// Registry of connections keyed by target
///
/// `None` is the in-memory target. Each `get_or_open(None)` returns the same
/// in-memory database for the lifetime of the registry entry.
pub struct ConnectionRegistry<C> {
    connections: HashMap<Option<PathBuf>, Rc<C>>,
}

impl<C> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }
}

impl<C: CatalogConnection> ConnectionRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a connection for the given target
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut registry = ConnectionRegistry::<DuckDbConnection>::new();
    /// let a = registry.get_or_open(Some(Path::new("a.duckdb")))?;
    /// let b = registry.get_or_open(Some(Path::new("a.duckdb")))?;
    /// assert!(Rc::ptr_eq(&a, &b));
    /// ```
    pub fn get_or_open(&mut self, target: Option<&Path>) -> CatalogResult<Rc<C>> {
        let key = target.map(Path::to_path_buf);
        if let Some(conn) = self.connections.get(&key) {
            return Ok(Rc::clone(conn));
        }

        debug!(target = ?key, "Opening connection for registry");
        let conn = Rc::new(C::open(target)?);
        self.connections.insert(key, Rc::clone(&conn));
        Ok(conn)
    }

    pub fn contains(&self, target: Option<&Path>) -> bool {
        self.connections.contains_key(&target.map(Path::to_path_buf))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Drop the registry's handle for one target
    ///
    /// Returns `true` if an entry was removed. Other owners keep the
    /// connection alive until they drop it too.
    pub fn close(&mut self, target: Option<&Path>) -> bool {
        self.connections
            .remove(&target.map(Path::to_path_buf))
            .is_some()
    }

    /// Drop every handle held by the registry
    pub fn close_all(&mut self) {
        self.connections.clear();
    }
}
