// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Catalog-specific test helpers and custom assertions

use duckcat_catalog::{
    is_system_view, CatalogColumn, CatalogEntity, CatalogRecord, CatalogRows, ObjectType,
};

/// Custom assertion helpers for catalog testing
pub struct CatalogAssertions;

impl CatalogAssertions {
    /// Assert the exact `schema.table` sequence of entity rows
    pub fn assert_qualified_names(rows: &[CatalogEntity], expected: &[&str]) {
        let actual: Vec<String> = rows.iter().map(CatalogEntity::qualified_name).collect();
        assert_eq!(actual, expected, "Entity names mismatch");
    }

    /// Assert that no row is a view in a system schema
    pub fn assert_no_system_views<T: CatalogRecord>(rows: &[T]) {
        for row in rows {
            assert!(
                !is_system_view(row),
                "Unexpected system view {}.{}",
                row.schema_name(),
                row.table_name()
            );
        }
    }

    /// Assert that every row has the given object type
    pub fn assert_all_of_type<T: CatalogRecord>(rows: &[T], object_type: ObjectType) {
        for row in rows {
            assert_eq!(
                row.object_type(),
                object_type,
                "{}.{} has the wrong object type",
                row.schema_name(),
                row.table_name()
            );
        }
    }

    /// Assert that rows are ordered by schema, table and column index
    pub fn assert_column_order(columns: &[CatalogColumn]) {
        for pair in columns.windows(2) {
            let a = (&pair[0].schema_name, &pair[0].table_name, pair[0].column_index);
            let b = (&pair[1].schema_name, &pair[1].table_name, pair[1].column_index);
            assert!(a < b, "Columns out of order: {:?} before {:?}", a, b);
        }
    }

    /// Assert that an empty rowset still reports its column schema
    pub fn assert_empty_with_schema(rows: &CatalogRows) {
        assert!(rows.is_empty(), "Expected no rows, found {}", rows.len());
        for field in ["schema_name", "table_name", "object_type"] {
            assert!(
                rows.column_names().contains(&field),
                "Empty rowset lost column '{}'",
                field
            );
        }
    }

    /// Assert that the Markdown prompt marks exactly `column` as a key
    pub fn assert_pk_marked_only(prompt: &str, column: &str) {
        let marked: Vec<&str> = prompt.lines().filter(|l| l.contains('✓')).collect();
        assert_eq!(marked.len(), 1, "Expected one marked row, found {:?}", marked);
        assert!(
            marked[0].starts_with(&format!("| {} ", column)),
            "Marked row is not '{}': {}",
            column,
            marked[0]
        );
    }
}
