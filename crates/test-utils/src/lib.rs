// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for the nested SQL compiler
//!
//! This crate provides common testing components including:
//! - Fluent syntax-tree builders, so tests need no parser
//! - A mock catalog that records every lookup
//! - Catalog and statement fixtures
//! - Assertions on bindings, problems and physical plans

pub mod assertions;
pub mod fixtures;
pub mod mock_ast;
pub mod mock_catalog;

// Re-exports for convenience
pub use assertions::PlanAssertions;
pub use fixtures::{CatalogFixtures, StatementFixtures};
pub use mock_ast::{MockDmlBuilder, MockFromItem, MockSelectBuilder};
pub use mock_catalog::{MockCatalog, MockCatalogBuilder};
