//! # error.rs
//!
//! Error taxonomy shared by every stage of the pipeline.
//!
//! Each stage owns one error type so callers can match on exactly the failures
//! that stage can produce. [`Error`] gathers all of them for the [`crate::Builder`]
//! convenience path.

use crate::types::ResultType;
use std::ops::Range;

/// Failure while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unknown symbol '{symbol}' at {position}")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("unbalanced bracket '{bracket}' at {position}")]
    UnbalancedBracket { bracket: char, position: usize },

    #[error("malformed number '{text}' at {}..{}", span.start, span.end)]
    MalformedNumber { text: String, span: Range<usize> },

    #[error("operator 'not' at {position} has no operand")]
    MissingNotOperand { position: usize },

    #[error("degree marker at {position} has no numeric magnitude")]
    MissingAngleMagnitude { position: usize },

    #[error("ambiguous phase-only literal at {position}: expected 'm+a°', 'm-a°' or 'm∠a°'")]
    AmbiguousPhase { position: usize },
}

/// Failure while building an expression tree from tokens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("empty expression")]
    EmptyInput,

    #[error("unexpected token '{found}' at index {index}")]
    UnexpectedToken { found: String, index: usize },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("function '{name}' does not accept {found} argument(s)")]
    ArityMismatch { name: String, found: usize },

    #[error("the left side of an assignment must be a variable or a function head, got '{found}'")]
    InvalidAssignmentTarget { found: String },

    #[error("'{operator}' requires a variable operand, got '{found}'")]
    InvalidIncrementTarget { operator: &'static str, found: String },

    #[error("'{name}' expects a variable at argument {position}, got '{found}'")]
    ExpectedVariable { name: &'static str, position: usize, found: String },

    #[error(transparent)]
    MatrixShape(#[from] MatrixShapeError),
}

/// A matrix was built from vectors of different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("matrix row {row} has {found} element(s), expected {expected}")]
pub struct MatrixShapeError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// Operand types that a node does not accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeMismatchError {
    /// A unary or variadic node received an operand type outside its accepted set.
    #[error("'{node}' does not accept an operand of type {found}")]
    ParameterTypeMismatch { node: String, found: ResultType },

    /// A binary node received a left/right combination outside its table.
    #[error("'{node}' does not accept operands of types {left} and {right}")]
    BinaryParameterTypeMismatch {
        node: String,
        left: ResultType,
        right: ResultType,
    },

    /// A variadic or aggregate node received heterogeneous or invalid elements.
    #[error("'{node}' argument {position} has type {found}, which does not fit")]
    DifferentParameterTypeMismatch {
        node: String,
        position: usize,
        found: ResultType,
    },
}

/// Failure raised by the simplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimplifyError {
    #[error("division by zero")]
    DivideByZero,

    #[error(transparent)]
    MatrixShape(#[from] MatrixShapeError),
}

/// Failure raised by the differentiator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("function '{name}' with {arity} argument(s) has no registered body")]
    UnboundFunction { name: String, arity: usize },

    #[error("'{0}' cannot be differentiated")]
    NotDifferentiable(String),

    #[error(transparent)]
    Simplify(#[from] SimplifyError),

    #[error(transparent)]
    MatrixShape(#[from] MatrixShapeError),
}

/// Any error the crate can produce.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Type(#[from] TypeMismatchError),

    #[error(transparent)]
    Simplify(#[from] SimplifyError),

    #[error(transparent)]
    Diff(#[from] DiffError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LexError::UnknownSymbol { symbol: '$', position: 3 };
        assert_eq!(err.to_string(), "unknown symbol '$' at 3");

        let err = MatrixShapeError { row: 1, expected: 2, found: 3 };
        assert_eq!(err.to_string(), "matrix row 1 has 3 element(s), expected 2");

        let err = TypeMismatchError::BinaryParameterTypeMismatch {
            node: "+".into(),
            left: ResultType::AngleNumber,
            right: ResultType::PowerNumber,
        };
        assert_eq!(err.to_string(), "'+' does not accept operands of types AngleNumber and PowerNumber");
    }

    #[test]
    fn test_conversions() {
        let err: ParseError = MatrixShapeError { row: 1, expected: 2, found: 1 }.into();
        assert!(matches!(err, ParseError::MatrixShape(_)));

        let err: DiffError = SimplifyError::DivideByZero.into();
        assert_eq!(err, DiffError::Simplify(SimplifyError::DivideByZero));

        let err: Error = LexError::MissingNotOperand { position: 0 }.into();
        assert!(matches!(err, Error::Lex(_)));
    }
}
