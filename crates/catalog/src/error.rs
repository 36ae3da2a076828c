// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! Lookups never fail; only building and loading a catalog can.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building or loading a catalog
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("Failed to read catalog file '{path}': {message}")]
    Io { path: String, message: String },

    /// The catalog document is malformed
    #[error("Failed to parse catalog data: {0}")]
    Parse(String),

    /// The file extension names no supported format
    #[error("Unsupported catalog format: '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// Two entries share the exact same name
    #[error("Catalog entry '{0}' is registered twice")]
    DuplicateEntry(String),
}
