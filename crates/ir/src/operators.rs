// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Leaf node types shared by the syntax tree and the plan trees
//!
//! ## Literal values
//!
//! [`Literal`] supports the scalar constants of the language:
//!
//! - `Null` / `Missing`: the two absent values of semi-structured data
//! - `Boolean`, `Integer`, `Float`, `String`
//!
//! ## Operators
//!
//! - **Arithmetic**: Add, Sub, Mul, Div, Mod
//! - **Comparison**: Eq, NotEq, Lt, LtEq, Gt, GtEq
//! - **Logical**: And, Or
//! - **String**: Concat, Like
//! - **Other**: In, Is
//!
//! Their evaluation is the business of the execution engine; the compiler only
//! carries them through.

use serde::{Deserialize, Serialize};

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Missing,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Literal::String(value.into())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,
    Like,

    // Other
    In,
    Is,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// Kind of a collection constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// `[a, b]`
    List,
    /// `<<a, b>>`
    Bag,
    /// `(a b)`
    Sexp,
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    /// Comma-separated FROM items
    Cross,
}

/// Bag operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// ALL / DISTINCT quantifier for bag operators, SELECT and aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetQuantifier {
    #[default]
    All,
    Distinct,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Placement of NULL and MISSING values in a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    First,
    Last,
}
