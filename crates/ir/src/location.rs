// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Source locations carried by syntax nodes and reported with problems

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location in the original query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: u32,
    /// Character offset within the line (1-based)
    pub offset: u32,
}

impl SourceLocation {
    pub fn new(line: u32, offset: u32) -> Self {
        Self { line, offset }
    }

    /// Create a location from a 0-based row/column pair, as produced by most
    /// parser generators
    pub fn from_zero_based(row: u32, column: u32) -> Self {
        Self {
            line: row + 1,
            offset: column + 1,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}
