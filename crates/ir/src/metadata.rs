// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for catalog introspection results
//!
//! This module defines the typed records produced by a catalog fetch:
//! one [`CatalogEntity`] per table or view, one [`CatalogColumn`] per column
//! when column detail is requested, and the [`PrimaryKeySet`] merged onto
//! both. Records are materialized fresh on every fetch and never mutated by
//! the consumers that render them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Discriminator for the two kinds of catalog entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Table,
    View,
}

impl ObjectType {
    /// Literal tag used in catalog queries and rendered output
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Table => "table",
            ObjectType::View => "view",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an object type tag is neither `table` nor `view`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown object type: {0}")]
pub struct UnknownObjectType(pub String);

impl FromStr for ObjectType {
    type Err = UnknownObjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(ObjectType::Table),
            "view" => Ok(ObjectType::View),
            other => Err(UnknownObjectType(other.to_string())),
        }
    }
}

/// Sortable projection of a single record field
///
/// Variant order puts `Missing` last so absent optional values sort after
/// present ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Bool(bool),
    Int(i64),
    Text(&'a str),
    List(&'a [String]),
    Missing,
}

/// Named-field access shared by every record kind
///
/// The combiner sorts by field names supplied at runtime, and an empty rowset
/// still needs to report the columns it would have had.
pub trait CatalogRecord {
    /// Field names in output order
    const FIELDS: &'static [&'static str];

    fn schema_name(&self) -> &str;

    fn table_name(&self) -> &str;

    fn object_type(&self) -> ObjectType;

    /// Sort key for a named field, or `None` if the record has no such field
    fn sort_key(&self, field: &str) -> Option<SortKey<'_>>;

    fn has_field(field: &str) -> bool {
        Self::FIELDS.contains(&field)
    }
}

fn opt_text(value: &Option<String>) -> SortKey<'_> {
    value.as_deref().map_or(SortKey::Missing, SortKey::Text)
}

fn opt_list(value: &Option<Vec<String>>) -> SortKey<'_> {
    value.as_deref().map_or(SortKey::Missing, SortKey::List)
}

/// One table or view
///
/// For views `estimated_size` holds the declared column count: the engine
/// keeps no cardinality for views, so the catalog reuses that slot. This is a
/// known semantic gap, not a row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntity {
    pub schema_name: String,
    /// Table name, or the view name for views
    pub table_name: String,
    pub object_type: ObjectType,
    pub estimated_size: u64,
    pub temporary: bool,
    pub comment: Option<String>,
    /// Primary key columns, populated only when constraints were requested
    pub pk: Option<Vec<String>>,
}

impl CatalogEntity {
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        object_type: ObjectType,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            object_type,
            estimated_size: 0,
            temporary: false,
            comment: None,
            pk: None,
        }
    }

    /// Builder method: set estimated size
    pub fn with_estimated_size(mut self, size: u64) -> Self {
        self.estimated_size = size;
        self
    }

    /// Builder method: mark as temporary
    pub fn with_temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder method: set primary key columns
    pub fn with_pk<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pk = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// `schema.table` as shown to users
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

impl CatalogRecord for CatalogEntity {
    const FIELDS: &'static [&'static str] = &[
        "schema_name",
        "table_name",
        "object_type",
        "estimated_size",
        "temporary",
        "comment",
        "pk",
    ];

    fn schema_name(&self) -> &str {
        &self.schema_name
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        let key = match field {
            "schema_name" => SortKey::Text(&self.schema_name),
            "table_name" => SortKey::Text(&self.table_name),
            "object_type" => SortKey::Text(self.object_type.as_str()),
            "estimated_size" => SortKey::Int(saturating_i64(self.estimated_size)),
            "temporary" => SortKey::Bool(self.temporary),
            "comment" => opt_text(&self.comment),
            "pk" => opt_list(&self.pk),
            _ => return None,
        };
        Some(key)
    }
}

/// One column of a table or view, with its parent's fields denormalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub schema_name: String,
    pub table_name: String,
    pub object_type: ObjectType,
    /// Parent's `estimated_size` (column count for views)
    pub row_count: u64,
    pub table_comment: Option<String>,
    pub temporary: bool,
    /// Ordinal position as reported by the engine
    pub column_index: i64,
    pub column_name: String,
    pub data_type: String,
    pub comment: Option<String>,
    pub column_default: Option<String>,
    pub has_default: bool,
    pub is_nullable: bool,
    /// Parent's primary key; identical on every column of the table
    pub pk: Option<Vec<String>>,
}

impl CatalogColumn {
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        column_index: i64,
        column_name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            object_type: ObjectType::Table,
            row_count: 0,
            table_comment: None,
            temporary: false,
            column_index,
            column_name: column_name.into(),
            data_type: data_type.into(),
            comment: None,
            column_default: None,
            has_default: false,
            is_nullable: true,
            pk: None,
        }
    }

    /// Builder method: set object type
    pub fn with_object_type(mut self, object_type: ObjectType) -> Self {
        self.object_type = object_type;
        self
    }

    /// Builder method: set the parent row count
    pub fn with_row_count(mut self, row_count: u64) -> Self {
        self.row_count = row_count;
        self
    }

    /// Builder method: set the parent comment
    pub fn with_table_comment(mut self, comment: impl Into<String>) -> Self {
        self.table_comment = Some(comment.into());
        self
    }

    /// Builder method: set column comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder method: set default expression
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.column_default = Some(default.into());
        self.has_default = true;
        self
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    /// Builder method: set the parent's primary key
    pub fn with_pk<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pk = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this column is part of its table's primary key
    pub fn is_primary_key(&self) -> bool {
        self.pk
            .as_ref()
            .is_some_and(|pk| pk.iter().any(|c| c == &self.column_name))
    }
}

impl CatalogRecord for CatalogColumn {
    const FIELDS: &'static [&'static str] = &[
        "schema_name",
        "table_name",
        "object_type",
        "row_count",
        "table_comment",
        "temporary",
        "column_index",
        "column_name",
        "data_type",
        "comment",
        "column_default",
        "has_default",
        "is_nullable",
        "pk",
    ];

    fn schema_name(&self) -> &str {
        &self.schema_name
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        let key = match field {
            "schema_name" => SortKey::Text(&self.schema_name),
            "table_name" => SortKey::Text(&self.table_name),
            "object_type" => SortKey::Text(self.object_type.as_str()),
            "row_count" => SortKey::Int(saturating_i64(self.row_count)),
            "table_comment" => opt_text(&self.table_comment),
            "temporary" => SortKey::Bool(self.temporary),
            "column_index" => SortKey::Int(self.column_index),
            "column_name" => SortKey::Text(&self.column_name),
            "data_type" => SortKey::Text(&self.data_type),
            "comment" => opt_text(&self.comment),
            "column_default" => opt_text(&self.column_default),
            "has_default" => SortKey::Bool(self.has_default),
            "is_nullable" => SortKey::Bool(self.is_nullable),
            "pk" => opt_list(&self.pk),
            _ => return None,
        };
        Some(key)
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Primary key of one table, columns in key order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeySet {
    pub schema_name: String,
    pub table_name: String,
    pub pk: Vec<String>,
}

impl PrimaryKeySet {
    pub fn new<I, S>(schema_name: impl Into<String>, table_name: impl Into<String>, pk: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            pk: pk.into_iter().map(Into::into).collect(),
        }
    }
}

/// Level of detail of a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// One row per table or view
    #[default]
    Table,
    /// One row per column
    Column,
}

/// Grain-tagged fetch result
///
/// The column schema is fixed by the grain, so an empty result still reports
/// the full set of fields it would have carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "grain", content = "rows", rename_all = "lowercase")]
pub enum CatalogRows {
    Entities(Vec<CatalogEntity>),
    Columns(Vec<CatalogColumn>),
}

impl CatalogRows {
    pub fn detail_level(&self) -> DetailLevel {
        match self {
            CatalogRows::Entities(_) => DetailLevel::Table,
            CatalogRows::Columns(_) => DetailLevel::Column,
        }
    }

    /// Field names of this rowset, independent of row count
    pub fn column_names(&self) -> &'static [&'static str] {
        match self {
            CatalogRows::Entities(_) => CatalogEntity::FIELDS,
            CatalogRows::Columns(_) => CatalogColumn::FIELDS,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CatalogRows::Entities(rows) => rows.len(),
            CatalogRows::Columns(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_entities(&self) -> Option<&[CatalogEntity]> {
        match self {
            CatalogRows::Entities(rows) => Some(rows),
            CatalogRows::Columns(_) => None,
        }
    }

    pub fn as_columns(&self) -> Option<&[CatalogColumn]> {
        match self {
            CatalogRows::Columns(rows) => Some(rows),
            CatalogRows::Entities(_) => None,
        }
    }

    pub fn into_entities(self) -> Option<Vec<CatalogEntity>> {
        match self {
            CatalogRows::Entities(rows) => Some(rows),
            CatalogRows::Columns(_) => None,
        }
    }

    pub fn into_columns(self) -> Option<Vec<CatalogColumn>> {
        match self {
            CatalogRows::Columns(rows) => Some(rows),
            CatalogRows::Entities(_) => None,
        }
    }
}

/// Compare two records field by field in the given order
pub fn compare_by<T: CatalogRecord>(a: &T, b: &T, fields: &[&str]) -> Ordering {
    for field in fields {
        let ordering = a.sort_key(field).cmp(&b.sort_key(field));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_round_trip_tag() {
        assert_eq!("table".parse::<ObjectType>(), Ok(ObjectType::Table));
        assert_eq!("view".parse::<ObjectType>(), Ok(ObjectType::View));
        assert!("index".parse::<ObjectType>().is_err());
        assert_eq!(ObjectType::View.to_string(), "view");
    }

    #[test]
    fn test_entity_builder() {
        let entity = CatalogEntity::new("s1", "t1", ObjectType::Table)
            .with_estimated_size(3)
            .with_comment("people");
        assert_eq!(entity.qualified_name(), "s1.t1");
        assert_eq!(entity.estimated_size, 3);
        assert_eq!(entity.comment.as_deref(), Some("people"));
        assert!(entity.pk.is_none());
    }

    #[test]
    fn test_column_primary_key_membership() {
        let id = CatalogColumn::new("main", "with_pk", 1, "id", "INTEGER").with_pk(["id"]);
        let value = CatalogColumn::new("main", "with_pk", 2, "value", "VARCHAR").with_pk(["id"]);
        assert!(id.is_primary_key());
        assert!(!value.is_primary_key());
    }

    #[test]
    fn test_sort_key_unknown_field() {
        let entity = CatalogEntity::new("s", "t", ObjectType::Table);
        assert!(entity.sort_key("column_index").is_none());
        assert!(!CatalogEntity::has_field("column_index"));
        assert!(CatalogColumn::has_field("column_index"));
    }

    #[test]
    fn test_missing_sorts_last() {
        assert!(SortKey::Text("zzz") < SortKey::Missing);
    }

    #[test]
    fn test_compare_by_multiple_fields() {
        let a = CatalogColumn::new("s", "t", 1, "a", "INTEGER");
        let b = CatalogColumn::new("s", "t", 2, "b", "INTEGER");
        assert_eq!(
            compare_by(&a, &b, &["schema_name", "table_name", "column_index"]),
            Ordering::Less
        );
        assert_eq!(compare_by(&a, &b, &["schema_name"]), Ordering::Equal);
    }

    #[test]
    fn test_empty_rows_keep_schema() {
        let rows = CatalogRows::Entities(Vec::new());
        assert!(rows.is_empty());
        assert!(rows.column_names().contains(&"estimated_size"));

        let rows = CatalogRows::Columns(Vec::new());
        assert!(rows.column_names().contains(&"column_name"));
        assert_eq!(rows.detail_level(), DetailLevel::Column);
    }

    #[test]
    fn test_rows_serialize_with_grain_tag() {
        let rows = CatalogRows::Entities(vec![
            CatalogEntity::new("s1", "v1", ObjectType::View).with_estimated_size(2),
        ]);
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json["grain"], "entities");
        assert_eq!(json["rows"][0]["object_type"], "view");
        assert_eq!(json["rows"][0]["pk"], serde_json::Value::Null);
    }
}
