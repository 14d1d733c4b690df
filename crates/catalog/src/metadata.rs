// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for catalog results
//!
//! This module re-exports metadata types from the `duckcat-ir` crate.
//! These types define the records for tables, views, columns and keys.

// Re-export all metadata types from the ir crate
pub use duckcat_ir::{
    compare_by, CatalogColumn, CatalogEntity, CatalogRecord, CatalogRows, DetailLevel,
    ObjectType, PrimaryKeySet, Row, SortKey, Value,
};
