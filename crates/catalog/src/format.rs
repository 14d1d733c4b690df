// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Text rendering
//!
//! The row-count summary and the number formatting shared with the prompt
//! builder. Tables are rendered by `tabled` in Markdown style.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::filter::NameFilter;
use crate::metadata::CatalogEntity;

#[derive(Tabled)]
struct RowCountLine {
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Row Count")]
    row_count: String,
}

/// Format an integer with comma thousands separators
///
/// # Examples
///
/// ```
/// use duckcat_catalog::group_thousands;
///
/// assert_eq!(group_thousands(1234567), "1,234,567");
/// assert_eq!(group_thousands(12), "12");
/// ```
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the two-column row-count summary
///
/// Temporary entities are skipped. When nothing is left the result is the
/// single line `ⓘ no tables found in {filter}`, echoing the filter literal
/// (`None` when absent).
pub fn format_row_counts(entities: &[CatalogEntity], schema_names: &NameFilter) -> String {
    let lines: Vec<RowCountLine> = entities
        .iter()
        .filter(|e| !e.temporary)
        .map(|entity| RowCountLine {
            table: entity.qualified_name(),
            row_count: group_thousands(entity.estimated_size),
        })
        .collect();

    if lines.is_empty() {
        return format!("ⓘ no tables found in {}", schema_names.display_literal());
    }

    Table::new(lines)
        .with(Style::markdown())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ObjectType;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_row_counts_alignment() {
        let entities = vec![
            CatalogEntity::new("s1", "t1", ObjectType::Table).with_estimated_size(3),
            CatalogEntity::new("s1", "long_name", ObjectType::Table).with_estimated_size(1000),
        ];

        let rendered = format_row_counts(&entities, &NameFilter::any());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| Table        | Row Count |");
        assert!(lines[1].chars().all(|c| c == '|' || c == '-' || c == ':'));
        assert_eq!(lines[2], "| s1.t1        |         3 |");
        assert_eq!(lines[3], "| s1.long_name |     1,000 |");
    }

    #[test]
    fn test_format_row_counts() {
        let entities = vec![
            CatalogEntity::new("s1", "t1", ObjectType::Table).with_estimated_size(3),
            CatalogEntity::new("s1", "tmp", ObjectType::Table)
                .with_estimated_size(9)
                .with_temporary(true),
            CatalogEntity::new("special-schema", "table-with-dashes", ObjectType::Table)
                .with_estimated_size(1234),
        ];

        let out = format_row_counts(&entities, &NameFilter::any());
        assert!(out.contains("| s1.t1 "));
        assert!(out.contains("special-schema.table-with-dashes"));
        assert!(out.contains("1,234 |"));
        assert!(!out.contains("tmp"));
    }

    #[test]
    fn test_format_row_counts_empty_sentinel() {
        assert_eq!(
            format_row_counts(&[], &NameFilter::any()),
            "ⓘ no tables found in None"
        );
        assert_eq!(
            format_row_counts(&[], &NameFilter::only(["empty_schema"])),
            "ⓘ no tables found in ['empty_schema']"
        );

        let only_temp = vec![CatalogEntity::new("s", "t", ObjectType::Table).with_temporary(true)];
        assert_eq!(
            format_row_counts(&only_temp, &NameFilter::only(["s"])),
            "ⓘ no tables found in ['s']"
        );
    }
}
