// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Inspector configuration
//!
//! Prompt rendering options and the inspector's database target.
//!
//! Settings can be built in code, read from a JSON settings payload (under a
//! `"duckcat"` key), or parsed from YAML. Keys are accepted in snake_case or
//! camelCase.
//!
//! ## Example
//!
//! ```rust,ignore
//! use duckcat_catalog::{InspectorConfig, PromptFormat, PromptOptions};
//!
//! let config = InspectorConfig::from_yaml_str(
//!     "db_file_path: warehouse.duckdb\nprompt:\n  format: json\n  max_tables: 10\n",
//! )?;
//! assert_eq!(config.prompt.format, PromptFormat::Json);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

/// Rendering of each per-table prompt block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptFormat {
    #[default]
    Markdown,
    Json,
}

impl PromptFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptFormat::Markdown => "markdown",
            PromptFormat::Json => "json",
        }
    }
}

impl fmt::Display for PromptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(PromptFormat::Markdown),
            "json" => Ok(PromptFormat::Json),
            other => Err(ConfigError::InvalidOption {
                reason: format!("unknown prompt format '{}'", other),
            }),
        }
    }
}

/// Options for the LLM prompt builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptOptions {
    /// Show row counts in headers; when off every header reads `(0 rows)`
    #[serde(alias = "includeRowCounts")]
    pub include_row_counts: bool,

    /// Add a `PK` column marking primary-key columns
    #[serde(alias = "includeConstraints")]
    pub include_constraints: bool,

    #[serde(alias = "includeViews")]
    pub include_views: bool,

    #[serde(alias = "includeSystemViews")]
    pub include_system_views: bool,

    /// Maximum number of table sections
    #[serde(alias = "maxTables")]
    pub max_tables: Option<usize>,

    /// Maximum number of columns shown per table
    #[serde(alias = "maxColumns")]
    pub max_columns: Option<usize>,

    pub format: PromptFormat,

    /// Replaces the default preamble
    #[serde(alias = "promptPrefix")]
    pub prompt_prefix: Option<String>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            include_row_counts: true,
            include_constraints: true,
            include_views: true,
            include_system_views: true,
            max_tables: None,
            max_columns: None,
            format: PromptFormat::Markdown,
            prompt_prefix: None,
        }
    }
}

impl PromptOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: show or zero row counts
    pub fn with_row_counts(mut self, include: bool) -> Self {
        self.include_row_counts = include;
        self
    }

    /// Builder method: PK column on or off
    pub fn with_constraints(mut self, include: bool) -> Self {
        self.include_constraints = include;
        self
    }

    /// Builder method: include views
    pub fn with_views(mut self, include: bool) -> Self {
        self.include_views = include;
        self
    }

    /// Builder method: include views in system schemas
    pub fn with_system_views(mut self, include: bool) -> Self {
        self.include_system_views = include;
        self
    }

    /// Builder method: cap table sections
    pub fn with_max_tables(mut self, max_tables: usize) -> Self {
        self.max_tables = Some(max_tables);
        self
    }

    /// Builder method: cap columns per table
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = Some(max_columns);
        self
    }

    /// Builder method: set output format
    pub fn with_format(mut self, format: PromptFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder method: override the preamble
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prompt_prefix = Some(prefix.into());
        self
    }

    /// Check option values before any query runs
    ///
    /// `max_columns` must be at least 1: the truncation placeholder copies the
    /// last shown column.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_columns == Some(0) {
            return Err(ConfigError::InvalidOption {
                reason: "max_columns must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Inspector configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Database file; `None` opens an in-memory database
    #[serde(alias = "dbFilePath")]
    pub db_file_path: Option<PathBuf>,

    pub prompt: PromptOptions,
}

impl InspectorConfig {
    pub fn new(db_file_path: Option<PathBuf>) -> Self {
        Self {
            db_file_path,
            ..Default::default()
        }
    }

    /// Builder method: set prompt options
    pub fn with_prompt(mut self, prompt: PromptOptions) -> Self {
        self.prompt = prompt;
        self
    }

    /// Validate the configuration
    ///
    /// Checks that:
    /// - A database path, when given, is not empty
    /// - Prompt options are in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .db_file_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::EmptyDatabasePath);
        }
        self.prompt.validate()
    }

    /// Parse configuration from a JSON settings payload
    ///
    /// Expected shape:
    /// {
    ///   "duckcat": {
    ///     "dbFilePath": "warehouse.duckdb",
    ///     "prompt": { "maxTables": 20, "format": "json" }
    ///   }
    /// }
    pub fn from_json_settings(settings: &Value) -> Result<Self, ConfigError> {
        let section = settings
            .get("duckcat")
            .ok_or_else(|| ConfigError::MissingSection("duckcat".to_string()))?;
        let config: Self = serde_json::from_value(section.clone())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An option is out of range
    #[error("Invalid option: {reason}")]
    InvalidOption { reason: String },

    /// `db_file_path` was given but empty
    #[error("Database file path must not be empty")]
    EmptyDatabasePath,

    /// Settings payload has no section for this crate
    #[error("Missing settings section '{0}'")]
    MissingSection(String),

    /// Settings could not be deserialized
    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

impl From<ConfigError> for CatalogError {
    fn from(err: ConfigError) -> Self {
        CatalogError::ConfigurationError(err.to_string())
    }
}
