// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog entry metadata

use serde::{Deserialize, Serialize};

/// Kind of external entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Table,
    View,
    Procedure,
}

/// One named external entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name as registered; case-sensitive lookups compare against it exactly
    pub name: String,
    /// Namespace the entity lives in
    #[serde(default)]
    pub schema: Option<String>,
    /// Explicit unique id; derived from schema and name when absent
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CatalogEntry {
    /// Create an entry named `name` inside `schema`
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
            unique_id: None,
            kind: EntityKind::Table,
            comment: None,
        }
    }

    /// Create an entry without a schema
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            unique_id: None,
            kind: EntityKind::Table,
            comment: None,
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The id handed to the compiler: the explicit id, else `schema.name`,
    /// else the bare name
    pub fn resolved_id(&self) -> String {
        match (&self.unique_id, &self.schema) {
            (Some(id), _) => id.clone(),
            (None, Some(schema)) => format!("{}.{}", schema, self.name),
            (None, None) => self.name.clone(),
        }
    }
}
