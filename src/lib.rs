//! # formulasym
//!
//! `formulasym` is a Rust library for working with mathematical formulas
//! **symbolically**: it turns text into a typed expression tree, infers the result
//! type of the tree, differentiates it and simplifies it.
//!
//! ## Overview
//! - Tokenize formulas containing real, complex, boolean and unit-tagged literals.
//! - Parse them into an [`AstNode`] tree with operator precedence, implicit
//!   multiplication, vectors, matrices and user-defined function calls.
//! - Infer the [`ResultType`] of any tree, including physical quantities.
//! - Differentiate with respect to any variable, inlining user-defined functions.
//! - Simplify trees with algebraic identities and constant folding.
//!
//! The core never evaluates a formula numerically; every pass maps a tree to a new
//! tree (or to a type) and leaves its input untouched.
//!
//! ## Example
//! ```rust
//! use formulasym::{differentiate, parse, result_type, simplify, ResultType};
//!
//! let node = parse("x^2 + 3x").unwrap();
//! assert_eq!(result_type(&node), Ok(ResultType::Undefined));
//!
//! let derivative = differentiate(&node, "x").unwrap();
//! assert_eq!(simplify(&derivative).unwrap(), parse("2x + 3").unwrap());
//! ```
//!
//! ## Example: Context Tables
//! ```rust
//! use formulasym::{parse_with, AstNode, Parameters, ResultType, UserFunctionTable};
//! use formulasym::variable::{UserFunction, Value};
//! use formulasym::types::TypeAnalyzer;
//!
//! let mut users = UserFunctionTable::new();
//! users.register(UserFunction::new("f", &["t"], AstNode::variable("t").sin()));
//! let node = parse_with("f(v) * 2", &users).unwrap();
//!
//! let params = Parameters::from([("v", Value::Number(0.5))]);
//! let ty = TypeAnalyzer::with_parameters(&params).result_type(&node);
//! assert_eq!(ty, Ok(ResultType::Undefined));
//! ```
//!
//! ## Example: Retrieving All Names
//! ```rust
//! use formulasym::astnode::{BinaryKind, UnaryKind, VariadicKind};
//! use formulasym::constants;
//!
//! println!("Constants: {:?}", constants::names());
//! println!("Unary: {:?}", UnaryKind::names());
//! println!("Binary: {:?}", BinaryKind::names());
//! println!("Variadic: {:?}", VariadicKind::names());
//! ```
//!
//! ## License
//! Licensed under either **MIT** or **Apache-2.0** at your option.

pub mod astnode;
pub mod builder;
pub mod constants;
pub mod differentiate;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod simplify;
pub mod token;
pub mod types;
pub mod units;
pub mod variable;

pub use astnode::AstNode;
pub use builder::Builder;
pub use error::Error;
pub use types::ResultType;
pub use variable::{Parameters, UserFunctionTable};

use crate::differentiate::Differentiator;
use crate::error::{DiffError, LexError, SimplifyError, TypeMismatchError};
use crate::simplify::Simplifier;
use crate::token::Token;
use crate::types::TypeAnalyzer;

/// Splits a formula into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    lexer::tokenize(text)
}

/// Parses a formula with no user-defined functions registered.
///
/// Unknown function calls are still accepted and become
/// [`AstNode::UserFunction`] nodes.
///
/// # Example
/// ```rust
/// let node = formulasym::parse("sin(x) + 1").unwrap();
/// assert_eq!(node.to_string(), "sin(x) + 1");
/// ```
pub fn parse(text: &str) -> Result<AstNode, Error> {
    parse_with(text, &UserFunctionTable::new())
}

/// Parses a formula, validating call arity against `users`.
pub fn parse_with(text: &str, users: &UserFunctionTable) -> Result<AstNode, Error> {
    let tokens = lexer::tokenize(text)?;
    Ok(parser::parse(&tokens, users)?)
}

/// Infers the result type of `node` without parameter bindings.
pub fn result_type(node: &AstNode) -> Result<ResultType, TypeMismatchError> {
    TypeAnalyzer::new().result_type(node)
}

/// Differentiates `node` with respect to `variable` and returns the raw derivative tree.
///
/// User-defined calls cannot be inlined here; use [`Differentiator`] with a table for that.
pub fn differentiate(node: &AstNode, variable: &str) -> Result<AstNode, DiffError> {
    let users = UserFunctionTable::new();
    Differentiator::new(&users).differentiate(node, variable)
}

pub fn simplify(node: &AstNode) -> Result<AstNode, SimplifyError> {
    Simplifier::new().simplify(node)
}

#[cfg(test)]
mod lib_tests {
    use super::*;
    use crate::error::ParseError;

    #[test]
    fn test_pipeline() {
        let node = parse("sin(x)^2 + cos(x)^2").unwrap();
        assert_eq!(result_type(&node), Ok(ResultType::Undefined));

        let derivative = simplify(&differentiate(&node, "x").unwrap()).unwrap();
        assert_eq!(simplify(&derivative).unwrap(), derivative);
    }

    #[test]
    fn test_typed_literals() {
        assert_eq!(result_type(&parse("2 + 3i").unwrap()), Ok(ResultType::ComplexNumber));
        assert_eq!(result_type(&parse("{1, 2} * 3").unwrap()), Ok(ResultType::Vector));
        assert_eq!(result_type(&parse("1 < 2 && true").unwrap()), Ok(ResultType::Boolean));
    }

    #[test]
    fn test_tokenize_matches_parse() {
        let tokens = tokenize("1 + 2").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(parse("1 +"), Err(Error::Parse(ParseError::UnexpectedEnd { .. }))));
    }
}
