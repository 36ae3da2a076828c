// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Problems
//!
//! Structured diagnostics produced while compiling one statement.
//!
//! Problems are not errors: a pass that finds one reports it to the
//! [`ProblemCollector`] and keeps walking, so a single compilation surfaces
//! every problem at once. The caller decides afterwards whether the
//! compilation is usable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ident::Identifier;
use crate::location::SourceLocation;

/// Problem kinds
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemDetails {
    /// A reference bound to no local and no catalog entry
    #[error("No such variable named '{name}'{}", case_note(.case_sensitive))]
    UndefinedVariable { name: String, case_sensitive: bool },

    /// A frame declared the same name twice
    #[error("The variable '{name}' was already defined in this scope")]
    VariablePreviouslyDefined { name: String },
}

impl ProblemDetails {
    pub fn undefined_variable(name: &Identifier) -> Self {
        ProblemDetails::UndefinedVariable {
            name: name.text.clone(),
            case_sensitive: name.case.is_sensitive(),
        }
    }

    pub fn previously_defined(name: &Identifier) -> Self {
        ProblemDetails::VariablePreviouslyDefined {
            name: name.text.clone(),
        }
    }

    pub fn severity(&self) -> ProblemSeverity {
        match self {
            ProblemDetails::UndefinedVariable { .. } => ProblemSeverity::Error,
            ProblemDetails::VariablePreviouslyDefined { .. } => ProblemSeverity::Error,
        }
    }
}

fn case_note(case_sensitive: &bool) -> &'static str {
    if *case_sensitive {
        " (case-sensitive)"
    } else {
        ""
    }
}

/// Severity level for problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSeverity {
    Warning,
    Error,
}

/// A problem and where it was found
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    pub location: SourceLocation,
    pub details: ProblemDetails,
}

impl Problem {
    pub fn new(location: SourceLocation, details: ProblemDetails) -> Self {
        Self { location, details }
    }

    pub fn severity(&self) -> ProblemSeverity {
        self.details.severity()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.details)
    }
}

/// Append-only problem sink shared by the passes of one compilation
///
/// Problems keep their insertion order and are never de-duplicated.
#[derive(Debug, Clone, Default)]
pub struct ProblemCollector {
    problems: Vec<Problem>,
}

impl ProblemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.problems
            .iter()
            .any(|p| p.severity() == ProblemSeverity::Error)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }
}
