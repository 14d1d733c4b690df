// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # duckcat - Catalog Metadata Model
//!
//! This crate provides the engine-neutral types shared by the catalog layer:
//! - Typed catalog records (tables, views, columns, primary keys)
//! - A grain-tagged rowset that keeps its column schema when empty
//! - The positional row/value types exchanged with the SQL engine

pub mod metadata;
pub mod value;

// Re-export commonly used types
pub use metadata::{
    compare_by, CatalogColumn, CatalogEntity, CatalogRecord, CatalogRows, DetailLevel,
    ObjectType, PrimaryKeySet, SortKey, UnknownObjectType,
};
pub use value::{Row, Value};
