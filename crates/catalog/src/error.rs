// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.
//! Engine failures are propagated unchanged in meaning; an empty catalog is
//! never an error.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// Failed to open the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// A result cell did not have the shape the query selected
    #[error("Unexpected value in column '{column}': expected {expected}, found {found}")]
    UnexpectedValue {
        column: String,
        expected: String,
        found: String,
    },

    /// Invalid catalog configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// Failed to serialize rendered output
    #[error("Failed to serialize catalog data: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_value_message() {
        let err = CatalogError::UnexpectedValue {
            column: "estimated_size".to_string(),
            expected: "integer".to_string(),
            found: "text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected value in column 'estimated_size': expected integer, found text"
        );
    }

    #[test]
    fn test_error_serializes() {
        let err = CatalogError::QueryFailed("boom".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["QueryFailed"], "boom");
    }
}
