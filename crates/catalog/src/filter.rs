// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Filter normalization and WHERE clause building
//!
//! Caller filters are exact-match name lists. An absent filter and an empty
//! one both mean "no constraint": neither produces a predicate or a bound
//! parameter. Filter values are always bound as `?` parameters; only catalog
//! column names (and aliases chosen by the fetcher) appear in the SQL text.

use std::fmt;

use crate::metadata::ObjectType;

/// Exact-match name filter as supplied by the caller
///
/// Keeps the literal argument so diagnostics can echo it back, while
/// [`NameFilter::values`] exposes the normalized constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter(Option<Vec<String>>);

impl NameFilter {
    /// No filter: include everything
    pub fn any() -> Self {
        Self(None)
    }

    /// Restrict to the given names
    ///
    /// Accepts any iterable (arrays, vectors, sets). An empty iterable is
    /// kept as an empty list and behaves exactly like [`NameFilter::any`].
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(names.into_iter().map(Into::into).collect()))
    }

    /// The normalized constraint: `None` for absent and empty filters
    pub fn values(&self) -> Option<&[String]> {
        match &self.0 {
            Some(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }

    /// The literal argument as the caller wrote it: `None` or `['a', 'b']`
    pub fn display_literal(&self) -> String {
        match &self.0 {
            None => "None".to_string(),
            Some(values) => {
                let items: Vec<String> = values.iter().map(|v| python_repr(v)).collect();
                format!("[{}]", items.join(", "))
            }
        }
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_literal())
    }
}

impl From<Option<Vec<String>>> for NameFilter {
    fn from(value: Option<Vec<String>>) -> Self {
        Self(value)
    }
}

impl From<Vec<String>> for NameFilter {
    fn from(value: Vec<String>) -> Self {
        Self(Some(value))
    }
}

impl From<Vec<&str>> for NameFilter {
    fn from(value: Vec<&str>) -> Self {
        Self::only(value)
    }
}

impl From<&[&str]> for NameFilter {
    fn from(value: &[&str]) -> Self {
        Self::only(value.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for NameFilter {
    fn from(value: [&str; N]) -> Self {
        Self::only(value)
    }
}

/// Quote a string the way a Python list repr does
fn python_repr(value: &str) -> String {
    if value.contains('\'') && !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Parameterized WHERE clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    /// `WHERE ...` or empty when no condition applies
    pub clause: String,
    /// Bound values, in placeholder order
    pub params: Vec<String>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Build `WHERE col IN (?, ...) AND ...` from ordered conditions
///
/// Conditions whose value list is absent or empty are skipped. `params` is
/// the concatenation of the remaining value lists in iteration order, so
/// callers must supply conditions in a stable order.
///
/// # Examples
///
/// ```
/// use duckcat_catalog::build_where;
///
/// let schemas = vec!["s1".to_string()];
/// let clause = build_where([("schema_name", Some(schemas.as_slice()))], Some("t"));
/// assert_eq!(clause.clause, "WHERE t.schema_name IN (?)");
/// assert_eq!(clause.params, vec!["s1".to_string()]);
/// ```
pub fn build_where<'a, I>(conditions: I, alias: Option<&str>) -> WhereClause
where
    I: IntoIterator<Item = (&'a str, Option<&'a [String]>)>,
{
    let prefix = match alias {
        Some(alias) if !alias.is_empty() => format!("{}.", alias),
        _ => String::new(),
    };

    let mut fragments = Vec::new();
    let mut params = Vec::new();
    for (column, values) in conditions {
        let Some(values) = values.filter(|v| !v.is_empty()) else {
            continue;
        };
        let placeholders = vec!["?"; values.len()].join(", ");
        fragments.push(format!("{}{} IN ({})", prefix, column, placeholders));
        params.extend(values.iter().cloned());
    }

    if fragments.is_empty() {
        return WhereClause::default();
    }

    WhereClause {
        clause: format!("WHERE {}", fragments.join(" AND ")),
        params,
    }
}

/// Catalog column holding the entity name for each kind
pub fn name_column(kind: ObjectType) -> &'static str {
    match kind {
        ObjectType::Table => "table_name",
        ObjectType::View => "view_name",
    }
}

/// Ordered conditions for one entity kind
///
/// Schema filter first, then the name filter on the kind's name column.
/// Inactive filters are omitted entirely.
pub fn entity_conditions<'a>(
    kind: ObjectType,
    schema_names: &'a NameFilter,
    table_names: &'a NameFilter,
) -> Vec<(&'static str, Option<&'a [String]>)> {
    let mut conditions = Vec::with_capacity(2);
    if let Some(schemas) = schema_names.values() {
        conditions.push(("schema_name", Some(schemas)));
    }
    if let Some(tables) = table_names.values() {
        conditions.push((name_column(kind), Some(tables)));
    }
    conditions
}

/// Quote a catalog identifier for direct use in SQL text
///
/// Only identifiers read back from the catalog go through here; caller
/// values are bound as parameters instead.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_build_where_single_condition() {
        let values = owned(&["value"]);
        let clause = build_where([("column", Some(values.as_slice()))], None);
        assert_eq!(clause.clause, "WHERE column IN (?)");
        assert_eq!(clause.params, vec!["value".to_string()]);
    }

    #[test]
    fn test_build_where_multiple_conditions() {
        let col1 = owned(&["val1", "val2"]);
        let col2 = owned(&["val3"]);
        let clause = build_where(
            [("col1", Some(col1.as_slice())), ("col2", Some(col2.as_slice()))],
            None,
        );
        assert_eq!(clause.clause, "WHERE col1 IN (?, ?) AND col2 IN (?)");
        assert_eq!(clause.params, owned(&["val1", "val2", "val3"]));
    }

    #[test]
    fn test_build_where_with_alias() {
        let values = owned(&["value"]);
        let clause = build_where([("column", Some(values.as_slice()))], Some("t"));
        assert_eq!(clause.clause, "WHERE t.column IN (?)");
        assert_eq!(clause.params, vec!["value".to_string()]);
    }

    #[test]
    fn test_build_where_empty_conditions() {
        let empty: Vec<String> = Vec::new();
        let clause = build_where(
            [("a", None), ("b", Some(empty.as_slice()))],
            Some("t"),
        );
        assert_eq!(clause.clause, "");
        assert!(clause.params.is_empty());
        assert!(clause.is_empty());

        let none: [(&str, Option<&[String]>); 0] = [];
        assert_eq!(build_where(none, None), WhereClause::default());
    }

    #[test]
    fn test_build_where_skips_only_empty_entries() {
        let empty: Vec<String> = Vec::new();
        let tables = owned(&["t1"]);
        let clause = build_where(
            [("schema_name", Some(empty.as_slice())), ("table_name", Some(tables.as_slice()))],
            None,
        );
        assert_eq!(clause.clause, "WHERE table_name IN (?)");
        assert_eq!(clause.params, owned(&["t1"]));
    }

    #[test]
    fn test_entity_conditions_tables_and_views() {
        let schemas = NameFilter::only(["schema1", "schema2"]);
        let tables = NameFilter::only(["table1"]);
        let conditions = entity_conditions(ObjectType::Table, &schemas, &tables);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].0, "schema_name");
        assert_eq!(conditions[0].1, Some(owned(&["schema1", "schema2"]).as_slice()));
        assert_eq!(conditions[1].0, "table_name");

        let schema1 = NameFilter::only(["schema1"]);
        let views = NameFilter::only(["view1", "view2"]);
        let conditions = entity_conditions(ObjectType::View, &schema1, &views);
        assert_eq!(conditions[1].0, "view_name");
        assert_eq!(conditions[1].1, Some(owned(&["view1", "view2"]).as_slice()));
    }

    #[test]
    fn test_entity_conditions_partial_and_empty() {
        let schema1 = NameFilter::only(["schema1"]);
        let view1 = NameFilter::only(["view1"]);
        let any = NameFilter::any();

        let schema_only = entity_conditions(ObjectType::Table, &schema1, &any);
        assert_eq!(schema_only.len(), 1);
        assert_eq!(schema_only[0].0, "schema_name");

        let table_only = entity_conditions(ObjectType::View, &any, &view1);
        assert_eq!(table_only.len(), 1);
        assert_eq!(table_only[0].0, "view_name");

        let empty: Vec<&str> = Vec::new();
        let empty = NameFilter::only(empty);
        assert!(entity_conditions(ObjectType::Table, &empty, &any).is_empty());
        assert!(entity_conditions(ObjectType::Table, &any, &any).is_empty());
    }

    #[test]
    fn test_name_filter_normalizes_empty() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(NameFilter::any().values(), None);
        assert_eq!(NameFilter::only(empty).values(), None);
        assert_eq!(NameFilter::only(["a"]).values(), Some(owned(&["a"]).as_slice()));
    }

    #[test]
    fn test_name_filter_from_collections() {
        use std::collections::BTreeSet;

        let set: BTreeSet<&str> = ["b", "a"].into_iter().collect();
        assert_eq!(NameFilter::only(set).values(), Some(owned(&["a", "b"]).as_slice()));
        assert_eq!(NameFilter::from(["x"]).values(), Some(owned(&["x"]).as_slice()));
        assert_eq!(NameFilter::from(None).values(), None);
    }

    #[test]
    fn test_display_literal() {
        assert_eq!(NameFilter::any().display_literal(), "None");
        assert_eq!(NameFilter::only(["empty_schema"]).to_string(), "['empty_schema']");
        assert_eq!(NameFilter::only(["a", "b"]).to_string(), "['a', 'b']");
        let empty: Vec<&str> = Vec::new();
        assert_eq!(NameFilter::only(empty).to_string(), "[]");
        assert_eq!(NameFilter::only(["it's"]).to_string(), "[\"it's\"]");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("table-with-dashes"), "\"table-with-dashes\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
