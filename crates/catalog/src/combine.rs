// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Result combiner
//!
//! Unions table and view rows of the same grain, optionally drops views that
//! live in the engine's own schemas, and sorts the result.

use tracing::debug;

use crate::metadata::{compare_by, CatalogRecord, DetailLevel, ObjectType};

/// Schemas owned by the engine itself
///
/// Only views are filtered against this set. Tables are kept whatever their
/// schema, so user tables created in `main` are never dropped.
pub const SYSTEM_SCHEMAS: &[&str] = &["information_schema", "pg_catalog", "main"];

/// Default sort order for each grain
pub fn default_sort_keys(detail_level: DetailLevel) -> &'static [&'static str] {
    match detail_level {
        DetailLevel::Table => &["schema_name", "table_name"],
        DetailLevel::Column => &["schema_name", "table_name", "column_index"],
    }
}

pub fn is_system_view<T: CatalogRecord>(record: &T) -> bool {
    record.object_type() == ObjectType::View && SYSTEM_SCHEMAS.contains(&record.schema_name())
}

/// Drop views that belong to a system schema
pub fn filter_system_views<T: CatalogRecord>(rows: Vec<T>) -> Vec<T> {
    let before = rows.len();
    let kept: Vec<T> = rows.into_iter().filter(|row| !is_system_view(row)).collect();
    if kept.len() != before {
        debug!(dropped = before - kept.len(), "Filtered system views");
    }
    kept
}

/// Union tables and views, filter, then sort
///
/// Sorting is stable and ascending by each key in turn. When a key is not a
/// field of `T` the rows are returned in union order instead, so a column
/// grain key such as `column_index` is harmless on entity rows.
///
/// # Examples
///
/// ```
/// use duckcat_catalog::{combine, CatalogEntity, ObjectType};
///
/// let tables = vec![CatalogEntity::new("s", "b", ObjectType::Table)];
/// let views = vec![
///     CatalogEntity::new("s", "a", ObjectType::View),
///     CatalogEntity::new("main", "sys", ObjectType::View),
/// ];
/// let rows = combine(tables, Some(views), false, &["schema_name", "table_name"]);
/// let names: Vec<_> = rows.iter().map(|r| r.table_name.as_str()).collect();
/// assert_eq!(names, ["a", "b"]);
/// ```
pub fn combine<T: CatalogRecord>(
    tables: Vec<T>,
    views: Option<Vec<T>>,
    include_system_views: bool,
    sort_by: &[&str],
) -> Vec<T> {
    let mut rows = tables;
    if let Some(views) = views.filter(|v| !v.is_empty()) {
        rows.extend(views);
        if !include_system_views {
            rows = filter_system_views(rows);
        }
    }

    if let Some(missing) = sort_by.iter().find(|key| !T::has_field(key)) {
        debug!(key = *missing, "Sort key not present on rows, keeping union order");
        return rows;
    }
    rows.sort_by(|a, b| compare_by(a, b, sort_by));
    rows
}
