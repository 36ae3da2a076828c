// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for the compiler facade

use thiserror::Error;

use nested_sql_catalog::CatalogError;
use nested_sql_ir::Problem;
use nested_sql_physical::PhysicalError;

/// Result type alias for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type alias for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors of a fail-fast compilation
#[derive(Debug, Error)]
pub enum CompileError {
    /// The permissive pipeline reported problems
    #[error("Compilation reported {} problem(s): {}", .0.len(), summarize(.0))]
    Problems(Vec<Problem>),

    /// Physical lowering could not complete
    #[error("Physical lowering failed: {0}")]
    Physical(#[from] PhysicalError),

    /// The compiler was configured inconsistently
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl CompileError {
    /// Problems carried by a [`CompileError::Problems`] error
    pub fn problems(&self) -> &[Problem] {
        match self {
            CompileError::Problems(problems) => problems,
            _ => &[],
        }
    }
}

fn summarize(problems: &[Problem]) -> String {
    problems
        .iter()
        .map(|problem| problem.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Strict compilation cannot admit dynamic references
    #[error("strict compilation cannot allow undefined variables")]
    StrictWithUndefined,

    /// An environment variable holds something other than a boolean
    #[error("Invalid value '{value}' for {key} (expected true or false)")]
    InvalidValue { key: String, value: String },

    /// The settings payload does not match the expected shape
    #[error("Invalid settings: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use nested_sql_ir::{Identifier, ProblemDetails, SourceLocation};

    #[test]
    fn test_problems_display_lists_each_problem() {
        let err = CompileError::Problems(vec![
            Problem::new(
                SourceLocation::new(1, 8),
                ProblemDetails::undefined_variable(&Identifier::insensitive("x")),
            ),
            Problem::new(
                SourceLocation::new(2, 3),
                ProblemDetails::previously_defined(&Identifier::insensitive("a")),
            ),
        ]);
        assert_eq!(err.problems().len(), 2);
        assert_eq!(
            err.to_string(),
            "Compilation reported 2 problem(s): 1:8: No such variable named 'x'; \
             2:3: The variable 'a' was already defined in this scope"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: CompileError = ConfigError::StrictWithUndefined.into();
        assert!(err.problems().is_empty());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: strict compilation cannot allow undefined variables"
        );
    }
}
