// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for physical lowering

use serde::Serialize;
use thiserror::Error;

/// Result type alias for physical lowering
pub type PhysicalResult<T> = Result<T, PhysicalError>;

/// Errors that stop a resolved plan from being lowered
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum PhysicalError {
    /// A DML target did not resolve to a catalog entity
    #[error("{line}:{offset}: DML target '{name}' has no catalog id")]
    UnresolvedTarget { name: String, line: u32, offset: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unresolved_target() {
        let err = PhysicalError::UnresolvedTarget {
            name: "orders".to_string(),
            line: 2,
            offset: 13,
        };
        assert_eq!(err.to_string(), "2:13: DML target 'orders' has no catalog id");
    }
}
