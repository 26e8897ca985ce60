//! # builder.rs
//!
//! This module provides [`Builder`], which gathers a formula and its context tables
//! and runs the passes over them.

use crate::astnode::AstNode;
use crate::differentiate::{DiffOptions, Differentiator};
use crate::error::Error;
use crate::lexer;
use crate::parser;
use crate::simplify::Simplifier;
use crate::token::Token;
use crate::types::{ResultType, TypeAnalyzer};
use crate::variable::{Parameters, UserFunctionTable};

/// Configuration holder for running the passes on one formula.
#[derive(Debug, Clone)]
pub struct Builder {
    formula: String,
    params: Parameters,
    users: UserFunctionTable,
    diff_options: DiffOptions,
}

impl Builder {
    /// Creates a new `Builder` for the given formula.
    ///
    /// You can chain methods like `with_parameters` and `with_user_functions` to
    /// configure the builder before running a pass.
    ///
    /// # Examples
    /// ```rust
    /// use formulasym::Builder;
    ///
    /// let derivative = Builder::new("x^2 + 3x")
    ///     .simplify_derivatives(true)
    ///     .differentiate("x")
    ///     .expect("Failed to differentiate 'x^2 + 3x'");
    /// assert_eq!(derivative, formulasym::parse("2x + 3").unwrap());
    /// ```
    pub fn new(formula: &str) -> Self {
        Self {
            formula: formula.to_string(),
            params: Parameters::new(),
            users: UserFunctionTable::new(),
            diff_options: DiffOptions::default(),
        }
    }

    /// Sets the parameter values used by type analysis.
    ///
    /// Values already set are kept unless `params` replaces them.
    ///
    /// # Examples
    /// ```rust
    /// use formulasym::{Builder, Parameters, ResultType};
    ///
    /// let params = Parameters::from([("a", 1.0)]);
    /// let ty = Builder::new("a + 1").with_parameters(params).result_type();
    /// assert_eq!(ty, Ok(ResultType::Number));
    /// ```
    pub fn with_parameters(mut self, params: Parameters) -> Self {
        for (name, value) in params.iter() {
            self.params.insert(name.as_str(), value.clone());
        }
        self
    }

    /// Sets the user-defined functions used by the parser and the differentiator.
    ///
    /// # Examples
    /// ```rust
    /// use formulasym::{AstNode, Builder, UserFunctionTable};
    /// use formulasym::variable::UserFunction;
    ///
    /// let mut users = UserFunctionTable::new();
    /// let body = AstNode::variable("t") * AstNode::Number(2.0);
    /// users.register(UserFunction::new("double", &["t"], body));
    ///
    /// let derivative = Builder::new("double(x)")
    ///     .with_user_functions(users)
    ///     .simplify_derivatives(true)
    ///     .differentiate("x");
    /// assert_eq!(derivative, Ok(AstNode::Number(2.0)));
    /// ```
    pub fn with_user_functions(mut self, users: UserFunctionTable) -> Self {
        for func in users.iter() {
            self.users.register(func.clone());
        }
        self
    }

    /// Runs the simplifier on every derivative this builder produces.
    pub fn simplify_derivatives(mut self, enabled: bool) -> Self {
        self.diff_options.simplify = enabled;
        self
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn tokens(&self) -> Result<Vec<Token>, Error> {
        Ok(lexer::tokenize(&self.formula)?)
    }

    /// Parses the formula against the configured user functions.
    pub fn parse(&self) -> Result<AstNode, Error> {
        let tokens = self.tokens()?;
        Ok(parser::parse(&tokens, &self.users)?)
    }

    pub fn result_type(&self) -> Result<ResultType, Error> {
        let node = self.parse()?;
        Ok(TypeAnalyzer::with_parameters(&self.params).result_type(&node)?)
    }

    /// Differentiates the formula with respect to `variable`.
    pub fn differentiate(&self, variable: &str) -> Result<AstNode, Error> {
        let node = self.parse()?;
        let diff = Differentiator::new(&self.users).with_options(self.diff_options);
        Ok(diff.differentiate(&node, variable)?)
    }

    pub fn simplify(&self) -> Result<AstNode, Error> {
        let node = self.parse()?;
        Ok(Simplifier::new().simplify(&node)?)
    }
}

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::error::{DiffError, LexError, ParseError, SimplifyError, TypeMismatchError};
    use crate::variable::{UserFunction, Value};

    #[test]
    fn test_parse() {
        let node = Builder::new("1 + x").parse().unwrap();
        assert_eq!(node, AstNode::one().add(AstNode::variable("x")));
    }

    #[test]
    fn test_errors_are_wrapped() {
        assert!(matches!(Builder::new("1 $ 2").parse(), Err(Error::Lex(LexError::UnknownSymbol { .. }))));
        assert_eq!(Builder::new("").parse(), Err(Error::Parse(ParseError::EmptyInput)));
        assert!(matches!(
            Builder::new("true + 1").result_type(),
            Err(Error::Type(TypeMismatchError::BinaryParameterTypeMismatch { .. })),
        ));
        assert_eq!(Builder::new("1/0").simplify(), Err(Error::Simplify(SimplifyError::DivideByZero)));
        assert!(matches!(
            Builder::new("g(x)").differentiate("x"),
            Err(Error::Diff(DiffError::UnboundFunction { .. })),
        ));
    }

    #[test]
    fn test_parameters() {
        let params = Parameters::from([("v", Value::Vector(vec![1.0, 2.0]))]);
        let builder = Builder::new("2 * v").with_parameters(params);
        assert_eq!(builder.result_type(), Ok(ResultType::Vector));
        assert_eq!(Builder::new("2 * v").result_type(), Ok(ResultType::Undefined));
    }

    #[test]
    fn test_user_functions() {
        let mut users = UserFunctionTable::new();
        let t = AstNode::variable("t");
        users.register(UserFunction::new("sq", &["t"], t.clone() * t));

        let builder = Builder::new("sq(1, 2)").with_user_functions(users.clone());
        assert_eq!(builder.parse(), Err(Error::Parse(ParseError::ArityMismatch { name: "sq".into(), found: 2 })));

        let builder = Builder::new("sq(x)").with_user_functions(users).simplify_derivatives(true);
        assert_eq!(builder.differentiate("x"), Ok(AstNode::Number(2.0) * AstNode::variable("x")));
    }

    #[test]
    fn test_simplify_derivatives() {
        let raw = Builder::new("sin(2x)").differentiate("x").unwrap();
        assert_eq!(raw.to_string(), "cos(2 * x) * (2 * 1)");

        let simplified = Builder::new("sin(2x)").simplify_derivatives(true).differentiate("x").unwrap();
        assert_eq!(simplified.to_string(), "2 * cos(2 * x)");
    }

    #[test]
    fn test_send_between_threads() {
        let builder = Builder::new("x^2").simplify_derivatives(true);
        let handle = std::thread::spawn(move || builder.differentiate("x"));
        let derivative = handle.join().unwrap().unwrap();
        assert_eq!(derivative.to_string(), "2 * x");
    }
}
