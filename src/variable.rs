//! # variable.rs
//!
//! Read-only context tables consulted by the passes.
//!
//! - [`Parameters`] maps variable names to concrete values. The core never
//!   evaluates, but the type analyzer uses a bound value to decide the type of a
//!   variable instead of reporting `Undefined`.
//! - [`UserFunctionTable`] maps a function name and arity to its formal parameters
//!   and body. The parser validates call arity against it and the differentiator
//!   inlines bodies from it.

use crate::astnode::AstNode;
use crate::error::MatrixShapeError;
use crate::types::ResultType;
use crate::units::Quantity;
use num_complex::Complex;
use std::collections::HashMap;

/// A concrete value bound to a parameter name.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Complex(Complex<f64>),
    Quantity(Quantity),
    String(String),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl Value {
    /// Returns the type tag of the value.
    pub fn result_type(&self) -> ResultType {
        match self {
            Self::Number(_) => ResultType::Number,
            Self::Boolean(_) => ResultType::Boolean,
            Self::Complex(_) => ResultType::ComplexNumber,
            Self::Quantity(q) => ResultType::from(q.dimension()),
            Self::String(_) => ResultType::String,
            Self::Vector(_) => ResultType::Vector,
            Self::Matrix(_) => ResultType::Matrix,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<Complex<f64>> for Value {
    fn from(v: Complex<f64>) -> Self {
        Self::Complex(v)
    }
}

impl From<Quantity> for Value {
    fn from(v: Quantity) -> Self {
        Self::Quantity(v)
    }
}

/// A collection of named parameter values.
///
/// # Examples
///
/// ```
/// use formulasym::variable::{Parameters, Value};
///
/// let params = Parameters::from([("a", 1.0), ("b", 2.0)]);
/// assert!(params.contains("a"));
/// assert_eq!(params.get("b"), Some(&Value::Number(2.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    table: HashMap<String, Value>,
}

impl Parameters {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from an iterator of name/value pairs.
    pub fn from<I, S, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let mut params = Self::new();
        for (name, value) in items {
            params.insert(name, value);
        }
        params
    }

    /// Inserts or replaces a value.
    pub fn insert<S, V>(&mut self, name: S, value: V)
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.table.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.table.get(name)
    }

    /// Iterates over every stored name/value pair.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.table.iter()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// A user-defined function: name, formal parameters and body.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    name: String,
    params: Vec<String>,
    body: AstNode,
}

impl UserFunction {
    /// Creates a user function from its formal parameter names and body tree.
    pub fn new<S: Into<String>>(name: S, params: &[&str], body: AstNode) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn body(&self) -> &AstNode {
        &self.body
    }

    /// Returns the body with every formal parameter replaced by the matching actual.
    ///
    /// `args` must have exactly `arity()` elements.
    pub fn instantiate(&self, args: &[AstNode]) -> Result<AstNode, MatrixShapeError> {
        debug_assert_eq!(args.len(), self.arity());
        let bindings: HashMap<&str, &AstNode> = self.params.iter()
            .map(String::as_str)
            .zip(args.iter())
            .collect();
        self.body.substitute(&bindings)
    }
}

/// A table of user-defined functions keyed by name and arity.
///
/// # Examples
///
/// ```
/// use formulasym::variable::{UserFunction, UserFunctionTable};
/// use formulasym::AstNode;
///
/// let mut users = UserFunctionTable::new();
/// let body = AstNode::variable("x").pow(AstNode::Number(2.0));
/// users.register(UserFunction::new("square", &["x"], body));
///
/// assert!(users.get("square", 1).is_some());
/// assert!(users.get("square", 2).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct UserFunctionTable {
    table: HashMap<(String, usize), UserFunction>,
}

impl UserFunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function; an existing function with the same name and arity is replaced.
    pub fn register(&mut self, func: UserFunction) {
        self.table.insert((func.name.clone(), func.arity()), func);
    }

    /// Removes a function, returning it if it was registered.
    pub fn unregister(&mut self, name: &str, arity: usize) -> Option<UserFunction> {
        self.table.remove(&(name.to_string(), arity))
    }

    pub fn get(&self, name: &str, arity: usize) -> Option<&UserFunction> {
        self.table.get(&(name.to_string(), arity))
    }

    /// Returns `true` if any arity of `name` is registered.
    pub fn contains_name(&self, name: &str) -> bool {
        self.table.keys().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserFunction> {
        self.table.values()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}
