// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for duckcat
//!
//! This crate provides common testing components including:
//! - A scripted mock connection that records issued statements
//! - Seeded DuckDB database fixtures in temporary directories
//! - Catalog-specific assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_catalog;

// Re-exports for convenience
pub use assertions::CatalogAssertions;
pub use fixtures::{DbFixtures, TestDatabase};
pub use mock_catalog::{
    column_row, entity_row, patterns, pk_row, MockConnection, MockConnectionBuilder,
    RecordedQuery,
};
