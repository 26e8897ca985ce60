//! # astnode.rs
//!
//! The expression tree shared by every pass.
//!
//! An [`AstNode`] is immutable value data: passes never modify a tree in place, they
//! build a new one. Node kinds are grouped in families:
//!
//! - leaves: numbers, booleans, complex and rational literals, variables, quantities,
//! - [`UnaryKind`] operators and one-argument functions,
//! - [`BinaryKind`] operators and two-argument functions,
//! - [`VariadicKind`] aggregates such as `gcd` or `max`,
//! - structural nodes: vectors, matrices, user function calls, definitions, control
//!   constructs and the `simplify(e)` / `derivative(e, x)` meta-expressions.
//!
//! `Display` writes a tree back as formula text that parses into an equal tree.

use crate::error::MatrixShapeError;
use crate::units::Quantity;

use num_complex::Complex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

#[doc(hidden)]
/// Internal macro to define the unary node kinds.
///
/// This macro is **not intended for public use**.
/// Each kind declares the name written in formulas and in error messages.
macro_rules! unary_kinds {
    ($( $name:ident => $symbol:literal ),+ $(,)?) => {
        /// Kind of a [`AstNode::Unary`] node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum UnaryKind {
            $( $name ),+
        }

        impl UnaryKind {
            /// Every unary kind, in declaration order.
            pub const ALL: &'static [UnaryKind] = &[ $( UnaryKind::$name ),+ ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => $symbol, )+
                }
            }

            /// Returns a list of all unary kind names.
            pub fn names() -> &'static [&'static str] {
                &[ $( $symbol ),+ ]
            }
        }

        impl fmt::Display for UnaryKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

unary_kinds! {
    Negate      => "-",
    Factorial   => "!",
    Not         => "not",

    Abs         => "abs",
    Ceil        => "ceil",
    Floor       => "floor",
    Round       => "round",
    Trunc       => "trunc",
    Frac        => "frac",
    Sign        => "sign",

    Exp         => "exp",
    Ln          => "ln",
    Lg          => "lg",
    Lb          => "lb",
    Sqrt        => "sqrt",

    Sin         => "sin",
    Cos         => "cos",
    Tan         => "tan",
    Cot         => "cot",
    Sec         => "sec",
    Csc         => "csc",
    Arcsin      => "arcsin",
    Arccos      => "arccos",
    Arctan      => "arctan",
    Arccot      => "arccot",
    Arcsec      => "arcsec",
    Arccsc      => "arccsc",

    Sinh        => "sinh",
    Cosh        => "cosh",
    Tanh        => "tanh",
    Coth        => "coth",
    Sech        => "sech",
    Csch        => "csch",
    Arsinh      => "arsinh",
    Arcosh      => "arcosh",
    Artanh      => "artanh",
    Arcoth      => "arcoth",
    Arsech      => "arsech",
    Arcsch      => "arcsch",

    Re          => "re",
    Im          => "im",
    Phase       => "phase",
    Conjugate   => "conjugate",
    Reciprocal  => "reciprocal",

    ToDeg       => "todeg",
    ToRad       => "torad",
    ToGrad      => "tograd",
    ToNumber    => "tonumber",
    ToBin       => "tobin",
    ToOct       => "tooct",
    ToHex       => "tohex",

    Transpose   => "transpose",
    Det         => "det",
    Inverse     => "inverse",
}

impl UnaryKind {
    /// Returns `true` for the kinds written in call syntax, `name(x)`.
    pub fn is_function(&self) -> bool {
        !matches!(self, Self::Negate | Self::Factorial | Self::Not)
    }

    pub fn is_trigonometric(&self) -> bool {
        matches!(self, Self::Sin | Self::Cos | Self::Tan | Self::Cot | Self::Sec | Self::Csc)
    }

    pub fn is_inverse_trigonometric(&self) -> bool {
        matches!(self, Self::Arcsin | Self::Arccos | Self::Arctan | Self::Arccot | Self::Arcsec | Self::Arccsc)
    }

    pub fn is_hyperbolic(&self) -> bool {
        matches!(
            self,
            Self::Sinh | Self::Cosh | Self::Tanh | Self::Coth | Self::Sech | Self::Csch
                | Self::Arsinh | Self::Arcosh | Self::Artanh | Self::Arcoth | Self::Arsech | Self::Arcsch
        )
    }

    /// Returns the function that undoes this one, for the trigonometric,
    /// hyperbolic and exponential families.
    pub fn inverse(&self) -> Option<Self> {
        let pair = match self {
            Self::Sin => Self::Arcsin,
            Self::Cos => Self::Arccos,
            Self::Tan => Self::Arctan,
            Self::Cot => Self::Arccot,
            Self::Sec => Self::Arcsec,
            Self::Csc => Self::Arccsc,
            Self::Arcsin => Self::Sin,
            Self::Arccos => Self::Cos,
            Self::Arctan => Self::Tan,
            Self::Arccot => Self::Cot,
            Self::Arcsec => Self::Sec,
            Self::Arccsc => Self::Csc,
            Self::Sinh => Self::Arsinh,
            Self::Cosh => Self::Arcosh,
            Self::Tanh => Self::Artanh,
            Self::Coth => Self::Arcoth,
            Self::Sech => Self::Arsech,
            Self::Csch => Self::Arcsch,
            Self::Arsinh => Self::Sinh,
            Self::Arcosh => Self::Cosh,
            Self::Artanh => Self::Tanh,
            Self::Arcoth => Self::Coth,
            Self::Arsech => Self::Sech,
            Self::Arcsch => Self::Csch,
            Self::Exp => Self::Ln,
            Self::Ln => Self::Exp,
            _ => return None,
        };
        Some(pair)
    }
}

#[doc(hidden)]
/// Internal macro to define the binary node kinds.
///
/// This macro is **not intended for public use**.
/// `infix` kinds are written between their operands, the others as `name(l, r)`.
macro_rules! binary_kinds {
    ($( $name:ident => { symbol: $symbol:literal, infix: $infix:literal } ),+ $(,)?) => {
        /// Kind of a [`AstNode::Binary`] node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BinaryKind {
            $( $name ),+
        }

        impl BinaryKind {
            /// Every binary kind, in declaration order.
            pub const ALL: &'static [BinaryKind] = &[ $( BinaryKind::$name ),+ ];

            pub fn symbol(&self) -> &'static str {
                match self {
                    $( Self::$name => $symbol, )+
                }
            }

            pub fn is_infix(&self) -> bool {
                match self {
                    $( Self::$name => $infix, )+
                }
            }

            /// Returns a list of all binary kind symbols.
            pub fn names() -> &'static [&'static str] {
                &[ $( $symbol ),+ ]
            }
        }

        impl fmt::Display for BinaryKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.symbol())
            }
        }
    };
}

binary_kinds! {
    Add          => { symbol: "+",    infix: true },
    Sub          => { symbol: "-",    infix: true },
    Mul          => { symbol: "*",    infix: true },
    Div          => { symbol: "/",    infix: true },
    Pow          => { symbol: "^",    infix: true },
    Mod          => { symbol: "%",    infix: true },
    Root         => { symbol: "root", infix: false },
    Log          => { symbol: "log",  infix: false },
    Round        => { symbol: "round", infix: false },

    Less         => { symbol: "<",    infix: true },
    LessEqual    => { symbol: "<=",   infix: true },
    Greater      => { symbol: ">",    infix: true },
    GreaterEqual => { symbol: ">=",   infix: true },
    Equal        => { symbol: "==",   infix: true },
    NotEqual     => { symbol: "!=",   infix: true },

    BitAnd       => { symbol: "&",    infix: true },
    BitOr        => { symbol: "|",    infix: true },
    Xor          => { symbol: "xor",  infix: true },
    Nand         => { symbol: "nand", infix: true },
    Nor          => { symbol: "nor",  infix: true },
    Implication  => { symbol: "->",   infix: true },
    Equivalence  => { symbol: "<->",  infix: true },
    And          => { symbol: "&&",   infix: true },
    Or           => { symbol: "||",   infix: true },

    DotProduct   => { symbol: "dotproduct",   infix: false },
    CrossProduct => { symbol: "crossproduct", infix: false },
}

impl BinaryKind {
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual | Self::Equal | Self::NotEqual
        )
    }

    /// Returns `true` for the bitwise/logical family (`& | xor nand nor -> <->`).
    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            Self::BitAnd | Self::BitOr | Self::Xor | Self::Nand | Self::Nor | Self::Implication | Self::Equivalence
        )
    }
}

#[doc(hidden)]
/// Internal macro to define the variadic node kinds with their minimum argument count.
macro_rules! variadic_kinds {
    ($( $name:ident => { name: $symbol:literal, min_args: $min:literal } ),+ $(,)?) => {
        /// Kind of a [`AstNode::Variadic`] node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum VariadicKind {
            $( $name ),+
        }

        impl VariadicKind {
            pub const ALL: &'static [VariadicKind] = &[ $( VariadicKind::$name ),+ ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => $symbol, )+
                }
            }

            /// Returns the smallest accepted argument count.
            pub fn min_args(&self) -> usize {
                match self {
                    $( Self::$name => $min, )+
                }
            }

            pub fn names() -> &'static [&'static str] {
                &[ $( $symbol ),+ ]
            }
        }

        impl fmt::Display for VariadicKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

variadic_kinds! {
    Gcd     => { name: "gcd",     min_args: 2 },
    Lcm     => { name: "lcm",     min_args: 2 },
    Min     => { name: "min",     min_args: 1 },
    Max     => { name: "max",     min_args: 1 },
    Avg     => { name: "avg",     min_args: 1 },
    Count   => { name: "count",   min_args: 1 },
    Sum     => { name: "sum",     min_args: 1 },
    Product => { name: "product", min_args: 1 },
    Stdev   => { name: "stdev",   min_args: 1 },
    Stdevp  => { name: "stdevp",  min_args: 1 },
    Var     => { name: "var",     min_args: 1 },
    Varp    => { name: "varp",    min_args: 1 },
}

/// Kind of a compound assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
        }
    }

    /// Returns the binary operation the assignment applies.
    pub fn operation(&self) -> BinaryKind {
        match self {
            Self::Add => BinaryKind::Add,
            Self::Sub => BinaryKind::Sub,
            Self::Mul => BinaryKind::Mul,
            Self::Div => BinaryKind::Div,
        }
    }
}

impl fmt::Display for AssignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An ordered, fixed-length sequence of expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    elements: Vec<AstNode>,
}

impl Vector {
    pub fn new(elements: Vec<AstNode>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[AstNode] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_elements(self) -> Vec<AstNode> {
        self.elements
    }
}

/// An ordered sequence of rows.
///
/// Rows are usually vector literals, which must all have the same length. Other row
/// expressions are kept as they are and rejected later by the type analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Vec<AstNode>,
}

impl Matrix {
    /// Builds a matrix, checking that every vector literal row has the same length.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixShapeError`] naming the first row whose length differs from the
    /// first vector row.
    ///
    /// # Examples
    ///
    /// ```
    /// use formulasym::astnode::{AstNode, Matrix, Vector};
    ///
    /// let row = |values: &[f64]| AstNode::Vector(Vector::new(values.iter().map(|v| AstNode::Number(*v)).collect()));
    /// assert!(Matrix::new(vec![row(&[1.0, 2.0]), row(&[3.0, 4.0])]).is_ok());
    /// assert!(Matrix::new(vec![row(&[1.0, 2.0]), row(&[3.0])]).is_err());
    /// ```
    pub fn new(rows: Vec<AstNode>) -> Result<Self, MatrixShapeError> {
        let mut expected = None;
        for (row, node) in rows.iter().enumerate() {
            let AstNode::Vector(v) = node else {
                continue;
            };
            match expected {
                None => expected = Some(v.len()),
                Some(expected) if expected != v.len() => {
                    return Err(MatrixShapeError { row, expected, found: v.len() });
                },
                Some(_) => {},
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[AstNode] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<AstNode> {
        self.rows
    }
}

/// Expression tree node.
#[derive(Debug, Clone)]
pub enum AstNode {
    /// Real literal.
    Number(f64),

    /// Boolean literal.
    Bool(bool),

    /// Complex literal.
    Complex(Complex<f64>),

    /// Rational literal `numerator // denominator`.
    Rational {
        numerator: Box<AstNode>,
        denominator: Box<AstNode>,
    },

    /// Variable or named constant.
    Variable(String),

    /// Magnitude tagged with a unit.
    Quantity(Quantity),

    Unary {
        kind: UnaryKind,
        expr: Box<AstNode>,
    },

    Binary {
        kind: BinaryKind,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },

    Variadic {
        kind: VariadicKind,
        args: Vec<AstNode>,
    },

    Vector(Vector),

    Matrix(Matrix),

    /// Call of a function that is not built in.
    UserFunction {
        name: String,
        args: Vec<AstNode>,
    },

    /// `target := value`, where the target is a variable or a function head `f(x, y)`.
    Define {
        target: Box<AstNode>,
        value: Box<AstNode>,
    },

    Undefine(Box<AstNode>),

    If {
        condition: Box<AstNode>,
        then: Box<AstNode>,
        otherwise: Option<Box<AstNode>>,
    },

    /// `for(init, condition, iteration, body)`
    For {
        init: Box<AstNode>,
        condition: Box<AstNode>,
        iteration: Box<AstNode>,
        body: Box<AstNode>,
    },

    /// `while(condition, body)`
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
    },

    Increment(Box<AstNode>),

    Decrement(Box<AstNode>),

    /// Compound assignment `target op= value`.
    Assign {
        kind: AssignKind,
        target: Box<AstNode>,
        value: Box<AstNode>,
    },

    /// `simplify(e)`
    Simplify(Box<AstNode>),

    /// `derivative(e, variable)`
    Derivative {
        expr: Box<AstNode>,
        variable: String,
    },
}

/// Equality of floats where NaN equals NaN.
fn same_f64(l: f64, r: f64) -> bool {
    l == r || (l.is_nan() && r.is_nan())
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(l), Self::Number(r)) => same_f64(*l, *r),
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Complex(l), Self::Complex(r)) => same_f64(l.re, r.re) && same_f64(l.im, r.im),
            (Self::Rational { numerator: ln, denominator: ld }, Self::Rational { numerator: rn, denominator: rd }) => {
                ln == rn && ld == rd
            },
            (Self::Variable(l), Self::Variable(r)) => l == r,
            (Self::Quantity(l), Self::Quantity(r)) => l.unit() == r.unit() && same_f64(l.value(), r.value()),
            (Self::Unary { kind: lk, expr: le }, Self::Unary { kind: rk, expr: re }) => lk == rk && le == re,
            (Self::Binary { kind: lk, left: ll, right: lr }, Self::Binary { kind: rk, left: rl, right: rr }) => {
                lk == rk && ll == rl && lr == rr
            },
            (Self::Variadic { kind: lk, args: la }, Self::Variadic { kind: rk, args: ra }) => lk == rk && la == ra,
            (Self::Vector(l), Self::Vector(r)) => l == r,
            (Self::Matrix(l), Self::Matrix(r)) => l == r,
            (Self::UserFunction { name: ln, args: la }, Self::UserFunction { name: rn, args: ra }) => ln == rn && la == ra,
            (Self::Define { target: lt, value: lv }, Self::Define { target: rt, value: rv }) => lt == rt && lv == rv,
            (Self::Undefine(l), Self::Undefine(r)) => l == r,
            (
                Self::If { condition: lc, then: lt, otherwise: lo },
                Self::If { condition: rc, then: rt, otherwise: ro },
            ) => lc == rc && lt == rt && lo == ro,
            (
                Self::For { init: li, condition: lc, iteration: lt, body: lb },
                Self::For { init: ri, condition: rc, iteration: rt, body: rb },
            ) => li == ri && lc == rc && lt == rt && lb == rb,
            (Self::While { condition: lc, body: lb }, Self::While { condition: rc, body: rb }) => lc == rc && lb == rb,
            (Self::Increment(l), Self::Increment(r)) => l == r,
            (Self::Decrement(l), Self::Decrement(r)) => l == r,
            (
                Self::Assign { kind: lk, target: lt, value: lv },
                Self::Assign { kind: rk, target: rt, value: rv },
            ) => lk == rk && lt == rt && lv == rv,
            (Self::Simplify(l), Self::Simplify(r)) => l == r,
            (Self::Derivative { expr: le, variable: lv }, Self::Derivative { expr: re, variable: rv }) => {
                le == re && lv == rv
            },
            _ => false,
        }
    }
}

/// AstNode helper impl to create new AstNode
impl AstNode {
    /// Create a number 0.0 Ast node.
    pub fn zero() -> Self {
        Self::Number(0.0)
    }

    /// Create a number 1.0 Ast node.
    pub fn one() -> Self {
        Self::Number(1.0)
    }

    pub fn variable<S: Into<String>>(name: S) -> Self {
        Self::Variable(name.into())
    }

    pub fn unary(kind: UnaryKind, expr: Self) -> Self {
        Self::Unary { kind, expr: Box::new(expr) }
    }

    pub fn binary(kind: BinaryKind, left: Self, right: Self) -> Self {
        Self::Binary { kind, left: Box::new(left), right: Box::new(right) }
    }

    pub fn rational(numerator: Self, denominator: Self) -> Self {
        Self::Rational { numerator: Box::new(numerator), denominator: Box::new(denominator) }
    }

    pub fn vector(elements: Vec<Self>) -> Self {
        Self::Vector(Vector::new(elements))
    }

    /// Creates an additional operator AST node `self + other`.
    pub fn add(self, other: Self) -> Self {
        Self::binary(BinaryKind::Add, self, other)
    }

    /// Creates a subtracted operator AST node `self - other`.
    pub fn sub(self, other: Self) -> Self {
        Self::binary(BinaryKind::Sub, self, other)
    }

    /// Creates a multiplied operator AST node `self * other`.
    pub fn mul(self, other: Self) -> Self {
        Self::binary(BinaryKind::Mul, self, other)
    }

    /// Creates a divided operator AST node `self / right`.
    pub fn div(self, right: Self) -> Self {
        Self::binary(BinaryKind::Div, self, right)
    }

    /// Creates `self ^ expr`.
    pub fn pow(self, expr: Self) -> Self {
        Self::binary(BinaryKind::Pow, self, expr)
    }

    /// Creates a negative AST node `-self`.
    pub fn negative(self) -> Self {
        Self::unary(UnaryKind::Negate, self)
    }

    pub fn sin(self) -> Self {
        Self::unary(UnaryKind::Sin, self)
    }

    pub fn cos(self) -> Self {
        Self::unary(UnaryKind::Cos, self)
    }

    pub fn sinh(self) -> Self {
        Self::unary(UnaryKind::Sinh, self)
    }

    pub fn cosh(self) -> Self {
        Self::unary(UnaryKind::Cosh, self)
    }

    pub fn exp(self) -> Self {
        Self::unary(UnaryKind::Exp, self)
    }

    pub fn ln(self) -> Self {
        Self::unary(UnaryKind::Ln, self)
    }

    pub fn sqrt(self) -> Self {
        Self::unary(UnaryKind::Sqrt, self)
    }

    pub fn abs(self) -> Self {
        Self::unary(UnaryKind::Abs, self)
    }
}

impl std::ops::Add<AstNode> for AstNode {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        AstNode::add(self, rhs)
    }
}

impl std::ops::Sub<AstNode> for AstNode {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        AstNode::sub(self, rhs)
    }
}

impl std::ops::Mul<AstNode> for AstNode {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        AstNode::mul(self, rhs)
    }
}

impl std::ops::Div<AstNode> for AstNode {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        AstNode::div(self, rhs)
    }
}

impl std::ops::BitXor<AstNode> for AstNode {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self::Output {
        self.pow(rhs)
    }
}

impl std::ops::Neg for AstNode {
    type Output = Self;
    fn neg(self) -> Self::Output {
        self.negative()
    }
}

impl From<f64> for AstNode {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Complex<f64>> for AstNode {
    fn from(value: Complex<f64>) -> Self {
        Self::Complex(value)
    }
}

impl From<Quantity> for AstNode {
    fn from(value: Quantity) -> Self {
        Self::Quantity(value)
    }
}

/// AstNode impl structural queries and traversal helpers
impl AstNode {
    /// Returns the value of a real literal.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` if the node is the real literal `value`.
    pub fn is_number(&self, value: f64) -> bool {
        self.as_number().is_some_and(|v| v == value)
    }

    /// Returns the direct children of the node, in source order.
    pub fn children(&self) -> SmallVec<[&AstNode; 4]> {
        let mut out = SmallVec::new();
        match self {
            Self::Number(_) | Self::Bool(_) | Self::Complex(_) | Self::Variable(_) | Self::Quantity(_) => {},
            Self::Rational { numerator, denominator } => {
                out.push(numerator.as_ref());
                out.push(denominator.as_ref());
            },
            Self::Unary { expr, .. }
            | Self::Undefine(expr)
            | Self::Increment(expr)
            | Self::Decrement(expr)
            | Self::Simplify(expr)
            | Self::Derivative { expr, .. } => out.push(expr.as_ref()),
            Self::Binary { left, right, .. } => {
                out.push(left.as_ref());
                out.push(right.as_ref());
            },
            Self::Define { target, value } | Self::Assign { target, value, .. } => {
                out.push(target.as_ref());
                out.push(value.as_ref());
            },
            Self::Variadic { args, .. } | Self::UserFunction { args, .. } => out.extend(args.iter()),
            Self::Vector(v) => out.extend(v.elements().iter()),
            Self::Matrix(m) => out.extend(m.rows().iter()),
            Self::If { condition, then, otherwise } => {
                out.push(condition.as_ref());
                out.push(then.as_ref());
                if let Some(otherwise) = otherwise {
                    out.push(otherwise.as_ref());
                }
            },
            Self::For { init, condition, iteration, body } => {
                out.push(init.as_ref());
                out.push(condition.as_ref());
                out.push(iteration.as_ref());
                out.push(body.as_ref());
            },
            Self::While { condition, body } => {
                out.push(condition.as_ref());
                out.push(body.as_ref());
            },
        }
        out
    }

    /// Returns `true` if `name` occurs as a variable anywhere in the tree.
    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            Self::Variable(v) => v == name,
            _ => self.children().iter().any(|child| child.contains_variable(name)),
        }
    }

    /// Rebuilds the node with every direct child replaced by `f(child)`.
    ///
    /// Matrices are rebuilt through [`Matrix::new`], so a mapping that changes the
    /// length of a vector row is reported as an error.
    pub fn try_map_children<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        E: From<MatrixShapeError>,
        F: FnMut(&AstNode) -> Result<AstNode, E>,
    {
        let mut bx = |node: &AstNode| f(node).map(Box::new);
        let node = match self {
            Self::Number(_) | Self::Bool(_) | Self::Complex(_) | Self::Variable(_) | Self::Quantity(_) => self.clone(),
            Self::Rational { numerator, denominator } => Self::Rational {
                numerator: bx(numerator)?,
                denominator: bx(denominator)?,
            },
            Self::Unary { kind, expr } => Self::Unary { kind: *kind, expr: bx(expr)? },
            Self::Binary { kind, left, right } => Self::Binary {
                kind: *kind,
                left: bx(left)?,
                right: bx(right)?,
            },
            Self::Variadic { kind, args } => Self::Variadic {
                kind: *kind,
                args: args.iter().map(|a| bx(a).map(|b| *b)).collect::<Result<_, E>>()?,
            },
            Self::Vector(v) => Self::Vector(Vector::new(
                v.elements().iter().map(|a| bx(a).map(|b| *b)).collect::<Result<_, E>>()?,
            )),
            Self::Matrix(m) => Self::Matrix(Matrix::new(
                m.rows().iter().map(|a| bx(a).map(|b| *b)).collect::<Result<_, E>>()?,
            )?),
            Self::UserFunction { name, args } => Self::UserFunction {
                name: name.clone(),
                args: args.iter().map(|a| bx(a).map(|b| *b)).collect::<Result<_, E>>()?,
            },
            Self::Define { target, value } => Self::Define { target: bx(target)?, value: bx(value)? },
            Self::Undefine(target) => Self::Undefine(bx(target)?),
            Self::If { condition, then, otherwise } => Self::If {
                condition: bx(condition)?,
                then: bx(then)?,
                otherwise: match otherwise {
                    Some(otherwise) => Some(bx(otherwise)?),
                    None => None,
                },
            },
            Self::For { init, condition, iteration, body } => Self::For {
                init: bx(init)?,
                condition: bx(condition)?,
                iteration: bx(iteration)?,
                body: bx(body)?,
            },
            Self::While { condition, body } => Self::While { condition: bx(condition)?, body: bx(body)? },
            Self::Increment(target) => Self::Increment(bx(target)?),
            Self::Decrement(target) => Self::Decrement(bx(target)?),
            Self::Assign { kind, target, value } => Self::Assign {
                kind: *kind,
                target: bx(target)?,
                value: bx(value)?,
            },
            Self::Simplify(expr) => Self::Simplify(bx(expr)?),
            Self::Derivative { expr, variable } => Self::Derivative {
                expr: bx(expr)?,
                variable: variable.clone(),
            },
        };
        Ok(node)
    }

    /// Replaces every bound variable with its expression.
    pub fn substitute(&self, bindings: &HashMap<&str, &AstNode>) -> Result<Self, MatrixShapeError> {
        match self {
            Self::Variable(name) => Ok(bindings.get(name.as_str()).map_or_else(|| self.clone(), |n| (*n).clone())),
            _ => self.try_map_children(|child| child.substitute(bindings)),
        }
    }
}

/// AstNode impl `Display` and its helpers
impl AstNode {
    /// Returns `true` if the node prints as a single unit that needs no parentheses
    /// when it appears as an operand.
    fn is_atomic(&self) -> bool {
        match self {
            Self::Number(_) | Self::Bool(_) | Self::Complex(_) | Self::Rational { .. }
            | Self::Variable(_) | Self::Quantity(_) => true,
            Self::Unary { kind, .. } => kind.is_function(),
            Self::Binary { kind, .. } => !kind.is_infix(),
            Self::Variadic { .. } | Self::Vector(_) | Self::Matrix(_) | Self::UserFunction { .. }
            | Self::Undefine(_) | Self::If { .. } | Self::For { .. } | Self::While { .. }
            | Self::Simplify(_) | Self::Derivative { .. } => true,
            Self::Define { .. } | Self::Increment(_) | Self::Decrement(_) | Self::Assign { .. } => false,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atomic() {
            write!(f, "{self}")
        } else {
            write!(f, "({self})")
        }
    }

    fn fmt_list(items: &[AstNode], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) if v.is_nan() => write!(f, "NaN"),
            Self::Number(v) if v.is_sign_negative() && *v != 0.0 => write!(f, "(-{})", -v),
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Complex(c) => {
                let sign = if c.im.is_sign_negative() { '-' } else { '+' };
                write!(f, "({}{}{}i)", c.re, sign, c.im.abs())
            },
            Self::Rational { numerator, denominator } => {
                write!(f, "(")?;
                numerator.fmt_operand(f)?;
                write!(f, "//")?;
                denominator.fmt_operand(f)?;
                write!(f, ")")
            },
            Self::Variable(name) => write!(f, "{name}"),
            Self::Quantity(q) => write!(f, "({q})"),
            Self::Unary { kind: UnaryKind::Negate, expr } => {
                write!(f, "-")?;
                match expr.as_ref() {
                    // a bare literal after `-` reads back as a negative literal
                    Self::Number(_) | Self::Quantity(_) => write!(f, "({expr})"),
                    _ => expr.fmt_operand(f),
                }
            },
            Self::Unary { kind: UnaryKind::Not, expr } => {
                write!(f, "~")?;
                expr.fmt_operand(f)
            },
            Self::Unary { kind: UnaryKind::Factorial, expr } => {
                expr.fmt_operand(f)?;
                write!(f, "!")
            },
            Self::Unary { kind, expr } => write!(f, "{kind}({expr})"),
            Self::Binary { kind, left, right } if kind.is_infix() => {
                left.fmt_operand(f)?;
                write!(f, " {kind} ")?;
                right.fmt_operand(f)
            },
            Self::Binary { kind, left, right } => write!(f, "{kind}({left}, {right})"),
            Self::Variadic { kind, args } => {
                write!(f, "{kind}(")?;
                Self::fmt_list(args, f)?;
                write!(f, ")")
            },
            Self::Vector(v) => {
                let nested = v.elements().iter().any(|e| matches!(e, Self::Vector(_)));
                write!(f, "{}{{", if nested { "vector" } else { "" })?;
                Self::fmt_list(v.elements(), f)?;
                write!(f, "}}")
            },
            Self::Matrix(m) => {
                let literal = !m.is_empty() && m.rows().iter().all(|r| matches!(r, Self::Vector(_)));
                write!(f, "{}{{", if literal { "" } else { "matrix" })?;
                Self::fmt_list(m.rows(), f)?;
                write!(f, "}}")
            },
            Self::UserFunction { name, args } => {
                write!(f, "{name}(")?;
                Self::fmt_list(args, f)?;
                write!(f, ")")
            },
            Self::Define { target, value } => {
                target.fmt_operand(f)?;
                write!(f, " := ")?;
                value.fmt_operand(f)
            },
            Self::Undefine(target) => write!(f, "undef({target})"),
            Self::If { condition, then, otherwise: Some(otherwise) } => {
                write!(f, "if({condition}, {then}, {otherwise})")
            },
            Self::If { condition, then, otherwise: None } => write!(f, "if({condition}, {then})"),
            Self::For { init, condition, iteration, body } => {
                write!(f, "for({init}, {condition}, {iteration}, {body})")
            },
            Self::While { condition, body } => write!(f, "while({condition}, {body})"),
            Self::Increment(target) => {
                target.fmt_operand(f)?;
                write!(f, "++")
            },
            Self::Decrement(target) => {
                target.fmt_operand(f)?;
                write!(f, "--")
            },
            Self::Assign { kind, target, value } => {
                target.fmt_operand(f)?;
                write!(f, " {kind} ")?;
                value.fmt_operand(f)
            },
            Self::Simplify(expr) => write!(f, "simplify({expr})"),
            Self::Derivative { expr, variable } => write!(f, "derivative({expr}, {variable})"),
        }
    }
}

#[cfg(test)]
mod kind_tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(UnaryKind::Arcsin.name(), "arcsin");
        assert_eq!(UnaryKind::names().len(), UnaryKind::ALL.len());
        assert_eq!(BinaryKind::Equivalence.symbol(), "<->");
        assert_eq!(VariadicKind::Stdevp.name(), "stdevp");
        assert_eq!(AssignKind::Mul.to_string(), "*=");
    }

    #[test]
    fn test_inverse_pairs() {
        for kind in UnaryKind::ALL {
            if let Some(inverse) = kind.inverse() {
                assert_eq!(inverse.inverse(), Some(*kind));
            }
        }
        let trig = UnaryKind::ALL.iter().filter(|k| k.is_trigonometric() || k.is_inverse_trigonometric()).count();
        let hyper = UnaryKind::ALL.iter().filter(|k| k.is_hyperbolic()).count();
        assert_eq!(trig, 12);
        assert_eq!(hyper, 12);
        assert_eq!(UnaryKind::Abs.inverse(), None);
    }

    #[test]
    fn test_min_args() {
        assert_eq!(VariadicKind::Gcd.min_args(), 2);
        assert_eq!(VariadicKind::Lcm.min_args(), 2);
        assert_eq!(VariadicKind::Sum.min_args(), 1);
    }
}

#[cfg(test)]
mod astnode_tests {
    use super::*;
    use crate::units::Unit;

    fn x() -> AstNode {
        AstNode::variable("x")
    }

    fn row(values: &[f64]) -> AstNode {
        AstNode::vector(values.iter().map(|v| AstNode::Number(*v)).collect())
    }

    #[test]
    fn test_matrix_shape() {
        assert!(Matrix::new(vec![row(&[1.0, 2.0]), row(&[3.0, 4.0])]).is_ok());
        assert_eq!(
            Matrix::new(vec![row(&[1.0, 2.0]), row(&[3.0, 4.0]), row(&[5.0])]),
            Err(MatrixShapeError { row: 2, expected: 2, found: 1 }),
        );
        // the check looks at lengths only
        let mixed = AstNode::vector(vec![AstNode::Bool(true)]);
        assert!(Matrix::new(vec![row(&[1.0, 2.0]), mixed]).is_err());
        // non-vector rows are left to the type analyzer
        assert!(Matrix::new(vec![row(&[1.0]), x()]).is_ok());
    }

    #[test]
    fn test_nan_equality() {
        assert_eq!(AstNode::Number(f64::NAN), AstNode::Number(f64::NAN));
        assert_ne!(AstNode::Number(1.0), AstNode::Number(f64::NAN));
        assert_eq!(
            AstNode::Complex(Complex::new(f64::NAN, 1.0)),
            AstNode::Complex(Complex::new(f64::NAN, 1.0)),
        );
        assert_ne!(AstNode::Number(1.0), AstNode::Complex(Complex::new(1.0, 0.0)));
    }

    #[test]
    fn test_ops() {
        let expr = AstNode::Number(2.0) * x() + AstNode::one();
        assert_eq!(
            expr,
            AstNode::binary(
                BinaryKind::Add,
                AstNode::binary(BinaryKind::Mul, AstNode::Number(2.0), x()),
                AstNode::Number(1.0),
            ),
        );
        assert_eq!(-x(), AstNode::unary(UnaryKind::Negate, x()));
        assert_eq!(x() ^ AstNode::Number(2.0), x().pow(AstNode::Number(2.0)));
    }

    #[test]
    fn test_contains_variable() {
        let expr = x().sin().add(AstNode::variable("y"));
        assert!(expr.contains_variable("x"));
        assert!(expr.contains_variable("y"));
        assert!(!expr.contains_variable("z"));
        assert!(!AstNode::Number(3.0).contains_variable("x"));

        let m = AstNode::Matrix(Matrix::new(vec![AstNode::vector(vec![x()])]).unwrap());
        assert!(m.contains_variable("x"));
    }

    #[test]
    fn test_substitute() {
        let expr = x().mul(x()).add(AstNode::variable("y"));
        let two = AstNode::Number(2.0);
        let bindings = HashMap::from([("x", &two)]);
        assert_eq!(
            expr.substitute(&bindings).unwrap(),
            two.clone().mul(two.clone()).add(AstNode::variable("y")),
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(x().sin().add(x().cos()).to_string(), "sin(x) + cos(x)");
        assert_eq!(AstNode::Number(-3.0).to_string(), "(-3)");
        assert_eq!(AstNode::Complex(Complex::new(3.0, -2.0)).to_string(), "(3-2i)");
        assert_eq!(AstNode::Quantity(Quantity::new(90.0, Unit::Degree)).to_string(), "(90 deg)");
        assert_eq!(x().add(AstNode::one()).negative().to_string(), "-(x + 1)");
        assert_eq!(AstNode::Number(3.0).negative().to_string(), "-(3)");
        assert_eq!(x().sub(x().sub(AstNode::one())).to_string(), "x - (x - 1)");
        assert_eq!(row(&[1.0, 2.0, 3.0]).to_string(), "{1, 2, 3}");
        assert_eq!(
            AstNode::binary(BinaryKind::Log, AstNode::Number(2.0), x()).to_string(),
            "log(2, x)",
        );

        let m = Matrix::new(vec![row(&[1.0, 2.0]), row(&[3.0, 4.0])]).unwrap();
        assert_eq!(AstNode::Matrix(m).to_string(), "{{1, 2}, {3, 4}}");
        let m = Matrix::new(vec![x()]).unwrap();
        assert_eq!(AstNode::Matrix(m).to_string(), "matrix{x}");
        assert_eq!(AstNode::vector(vec![row(&[1.0])]).to_string(), "vector{{1}}");
    }
}
