// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # LLM prompt builder
//!
//! Renders column-grain metadata as one block per table, in Markdown or JSON,
//! behind a preamble telling the model it may ask for SQL against them.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::config::{PromptFormat, PromptOptions};
use crate::error::CatalogResult;
use crate::format::group_thousands;
use crate::metadata::CatalogColumn;

/// Preamble used when no prefix is configured
pub const DEFAULT_PROMPT_PREFIX: &str =
    "The following DuckDB tables are available. You may request SQL queries against them.";

pub const NO_TABLES_MESSAGE: &str = "_No tables matched your filters._";

pub const PK_MARKER: &str = "✓";

/// Stands in for truncated column names, comments and types
pub const ELLIPSIS: &str = "…";

/// Columns of one table, in the order they were fetched
struct TableGroup<'a> {
    columns: Vec<&'a CatalogColumn>,
}

impl TableGroup<'_> {
    fn first(&self) -> &CatalogColumn {
        self.columns[0]
    }
}

/// Group by `(schema, table)` keeping first-appearance order
fn group_by_table(columns: &[CatalogColumn]) -> Vec<TableGroup<'_>> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<TableGroup<'_>> = Vec::new();
    for column in columns {
        let key = (column.schema_name.as_str(), column.table_name.as_str());
        match index.get(&key) {
            Some(&i) => groups[i].columns.push(column),
            None => {
                index.insert(key, groups.len());
                groups.push(TableGroup {
                    columns: vec![column],
                });
            }
        }
    }
    groups
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    #[serde(rename = "Column")]
    column: &'a str,
    #[serde(rename = "Comment")]
    comment: &'a str,
    #[serde(rename = "Type")]
    data_type: &'a str,
    #[serde(rename = "PK", skip_serializing_if = "Option::is_none")]
    pk: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    schema: &'a str,
    table: &'a str,
    rows: u64,
    comment: Option<&'a str>,
    columns: Vec<JsonColumn<'a>>,
}

/// One rendered column row
struct ColumnLine<'a> {
    name: &'a str,
    comment: &'a str,
    data_type: &'a str,
    is_pk: bool,
}

fn render_block(
    group: &TableGroup<'_>,
    options: &PromptOptions,
) -> CatalogResult<String> {
    let first = group.first();
    let rows = if options.include_row_counts {
        first.row_count
    } else {
        0
    };
    let table_comment = first
        .table_comment
        .as_deref()
        .filter(|c| !c.trim().is_empty());

    let pk: HashSet<&str> = first
        .pk
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let shown = match options.max_columns {
        Some(max) if group.columns.len() > max => &group.columns[..max],
        _ => &group.columns[..],
    };
    let mut lines: Vec<ColumnLine<'_>> = shown
        .iter()
        .map(|c| ColumnLine {
            name: &c.column_name,
            comment: c.comment.as_deref().unwrap_or(""),
            data_type: &c.data_type,
            is_pk: pk.contains(c.column_name.as_str()),
        })
        .collect();
    if shown.len() < group.columns.len() {
        lines.push(ColumnLine {
            name: ELLIPSIS,
            comment: ELLIPSIS,
            data_type: ELLIPSIS,
            is_pk: false,
        });
    }

    match options.format {
        PromptFormat::Markdown => {
            let mut builder = Builder::default();
            let mut header = vec!["Column", "Comment", "Type"];
            if options.include_constraints {
                header.push("PK");
            }
            builder.push_record(header);
            for line in &lines {
                let mut cells = vec![line.name, line.comment, line.data_type];
                if options.include_constraints {
                    cells.push(if line.is_pk { PK_MARKER } else { "" });
                }
                builder.push_record(cells);
            }
            let table = builder.build().with(Style::markdown()).to_string();

            let mut block = format!(
                "Table: `{}.{}` ({} rows)",
                first.schema_name,
                first.table_name,
                group_thousands(rows)
            );
            if let Some(comment) = table_comment {
                block.push('\n');
                block.push_str(comment);
            }
            block.push_str("\n\n");
            block.push_str(&table);
            Ok(block)
        }
        PromptFormat::Json => {
            let value = JsonTable {
                schema: &first.schema_name,
                table: &first.table_name,
                rows,
                comment: table_comment,
                columns: lines
                    .iter()
                    .map(|line| JsonColumn {
                        column: line.name,
                        comment: line.comment,
                        data_type: line.data_type,
                        pk: options
                            .include_constraints
                            .then_some(if line.is_pk { PK_MARKER } else { "" }),
                    })
                    .collect(),
            };
            Ok(serde_json::to_string_pretty(&value)?)
        }
    }
}

/// Render column-grain metadata into an LLM prompt
///
/// Rows must already be filtered and sorted; grouping keeps their order.
/// `include_views` and `include_system_views` are applied upstream and
/// ignored here.
///
/// # Errors
///
/// Returns `CatalogError::SerializationError` if a JSON block cannot be
/// serialized.
pub fn render_prompt(columns: &[CatalogColumn], options: &PromptOptions) -> CatalogResult<String> {
    let prefix = options
        .prompt_prefix
        .as_deref()
        .unwrap_or(DEFAULT_PROMPT_PREFIX);

    if columns.is_empty() {
        return Ok(format!("{}\n\n{}", prefix, NO_TABLES_MESSAGE));
    }

    let groups = group_by_table(columns);
    let limit = options.max_tables.unwrap_or(groups.len()).min(groups.len());

    let mut blocks = Vec::with_capacity(limit + 1);
    for group in &groups[..limit] {
        blocks.push(render_block(group, options)?);
    }
    if limit < groups.len() {
        blocks.push(format!(
            "{}{} more tables omitted",
            ELLIPSIS,
            groups.len() - limit
        ));
    }

    Ok(format!("{}\n\n{}", prefix, blocks.join("\n\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ObjectType;

    fn with_pk_table() -> Vec<CatalogColumn> {
        vec![
            CatalogColumn::new("main", "with_pk", 1, "id", "INTEGER")
                .with_row_count(1234)
                .with_pk(["id"])
                .with_nullable(false),
            CatalogColumn::new("main", "with_pk", 2, "value", "VARCHAR")
                .with_row_count(1234)
                .with_comment("free text")
                .with_pk(["id"]),
        ]
    }

    #[test]
    fn test_markdown_block() {
        let prompt = render_prompt(&with_pk_table(), &PromptOptions::default()).unwrap();
        let expected = format!(
            "{}\n\n\
Table: `main.with_pk` (1,234 rows)\n\
\n\
| Column | Comment   | Type    | PK |\n\
|--------|-----------|---------|----|\n\
| id     |           | INTEGER | ✓  |\n\
| value  | free text | VARCHAR |    |",
            DEFAULT_PROMPT_PREFIX
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_pk_marker_only_on_key_rows() {
        let prompt = render_prompt(&with_pk_table(), &PromptOptions::default()).unwrap();
        let marked: Vec<&str> = prompt.lines().filter(|l| l.contains(PK_MARKER)).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].starts_with("| id "));
    }

    #[test]
    fn test_without_constraints_has_no_pk_column() {
        let options = PromptOptions::default().with_constraints(false);
        let prompt = render_prompt(&with_pk_table(), &options).unwrap();
        assert!(!prompt.contains("| PK |"));
        assert!(!prompt.contains(PK_MARKER));
    }

    #[test]
    fn test_row_counts_disabled_shows_zero() {
        let options = PromptOptions::default().with_row_counts(false);
        let prompt = render_prompt(&with_pk_table(), &options).unwrap();
        assert!(prompt.contains("Table: `main.with_pk` (0 rows)"));
    }

    #[test]
    fn test_table_comment_line() {
        let mut columns = with_pk_table();
        for column in &mut columns {
            column.table_comment = Some("keyed values".to_string());
        }
        let prompt = render_prompt(&columns, &PromptOptions::default()).unwrap();
        assert!(prompt.contains("(1,234 rows)\nkeyed values\n\n|"));

        for column in &mut columns {
            column.table_comment = Some("   ".to_string());
        }
        let prompt = render_prompt(&columns, &PromptOptions::default()).unwrap();
        assert!(prompt.contains("(1,234 rows)\n\n|"));
    }

    #[test]
    fn test_max_tables_truncation() {
        let columns: Vec<CatalogColumn> = (0..5)
            .map(|i| CatalogColumn::new("s", format!("t{}", i), 0, "id", "INTEGER"))
            .collect();
        let options = PromptOptions::default().with_max_tables(2);
        let prompt = render_prompt(&columns, &options).unwrap();

        assert_eq!(prompt.matches("Table: `").count(), 2);
        assert!(prompt.contains("`s.t0`"));
        assert!(prompt.contains("`s.t1`"));
        assert!(!prompt.contains("`s.t2`"));
        assert!(prompt.ends_with("…3 more tables omitted"));

        let options = PromptOptions::default().with_max_tables(5);
        let prompt = render_prompt(&columns, &options).unwrap();
        assert!(!prompt.contains("omitted"));
    }

    #[test]
    fn test_max_columns_placeholder_row() {
        let options = PromptOptions::default().with_max_columns(1);
        let prompt = render_prompt(&with_pk_table(), &options).unwrap();
        assert!(prompt.contains("| id "));
        assert!(!prompt.contains("| value "));
        assert!(prompt.contains("| …      | …       | …       |    |"));
    }

    #[test]
    fn test_json_format() {
        let options = PromptOptions::default().with_format(PromptFormat::Json);
        let prompt = render_prompt(&with_pk_table(), &options).unwrap();
        let body = prompt
            .strip_prefix(&format!("{}\n\n", DEFAULT_PROMPT_PREFIX))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(body).unwrap();

        assert_eq!(value["schema"], "main");
        assert_eq!(value["table"], "with_pk");
        assert_eq!(value["rows"], 1234);
        assert!(value["comment"].is_null());
        assert_eq!(value["columns"][0]["Column"], "id");
        assert_eq!(value["columns"][0]["PK"], "✓");
        assert_eq!(value["columns"][1]["PK"], "");
        assert_eq!(value["columns"][1]["Comment"], "free text");

        let options = options.with_constraints(false);
        let prompt = render_prompt(&with_pk_table(), &options).unwrap();
        assert!(!prompt.contains("\"PK\""));
    }

    #[test]
    fn test_empty_and_custom_prefix() {
        let prompt = render_prompt(&[], &PromptOptions::default()).unwrap();
        assert_eq!(
            prompt,
            format!("{}\n\n_No tables matched your filters._", DEFAULT_PROMPT_PREFIX)
        );

        let options = PromptOptions::default().with_prefix("This is a custom prompt prefix.");
        let prompt = render_prompt(&with_pk_table(), &options).unwrap();
        assert!(prompt.starts_with("This is a custom prompt prefix.\n\nTable: "));
    }

    #[test]
    fn test_groups_keep_input_order() {
        let columns = vec![
            CatalogColumn::new("s", "b", 0, "x", "INTEGER"),
            CatalogColumn::new("s", "a", 0, "y", "INTEGER").with_object_type(ObjectType::View),
            CatalogColumn::new("s", "b", 1, "z", "INTEGER"),
        ];
        let prompt = render_prompt(&columns, &PromptOptions::default()).unwrap();
        let b = prompt.find("`s.b`").unwrap();
        let a = prompt.find("`s.a`").unwrap();
        assert!(b < a);
        assert_eq!(prompt.matches("Table: `").count(), 2);
    }
}
