//! # differentiate.rs
//!
//! Symbolic differentiation of expression trees.
//!
//! The [`Differentiator`] applies the usual calculus rules node by node and builds
//! the derivative tree without simplifying it. With [`DiffOptions::simplify`] set,
//! the result is passed through the [`Simplifier`].

use crate::astnode::{AstNode, BinaryKind, Matrix, UnaryKind, VariadicKind, Vector};
use crate::constants;
use crate::error::DiffError;
use crate::simplify::Simplifier;
use crate::variable::UserFunctionTable;

/// Nesting limit for user function bodies that call other user functions.
const MAX_INLINE_DEPTH: usize = 64;

/// Options for the differentiator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Run the simplifier on the derivative.
    pub simplify: bool,
}

/// Computes derivatives of expression trees.
///
/// User-function calls are inlined from the [`UserFunctionTable`] before they are
/// differentiated.
///
/// # Examples
///
/// ```
/// use formulasym::{parse, differentiate::{DiffOptions, Differentiator}};
/// use formulasym::variable::UserFunctionTable;
///
/// let users = UserFunctionTable::new();
/// let diff = Differentiator::new(&users).with_options(DiffOptions { simplify: true });
///
/// let node = parse("x^3").unwrap();
/// assert_eq!(diff.differentiate(&node, "x").unwrap(), parse("3 * x^2").unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Differentiator<'a> {
    users: &'a UserFunctionTable,
    options: DiffOptions,
}

impl<'a> Differentiator<'a> {
    pub fn new(users: &'a UserFunctionTable) -> Self {
        Self { users, options: DiffOptions::default() }
    }

    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Compute the derivative of `node` with respect to `variable`.
    ///
    /// # Arguments
    ///
    /// * `node` - The expression to differentiate.
    /// * `variable` - The name of the variable.
    ///
    /// # Returns
    ///
    /// * `Ok(AstNode)` - The derivative, simplified when the option is set.
    /// * `Err(DiffError)` - When `variable` is empty, a user function has no body for
    ///   the call arity, the tree contains a node with no derivative, or the
    ///   simplifier fails.
    pub fn differentiate(&self, node: &AstNode, variable: &str) -> Result<AstNode, DiffError> {
        if variable.is_empty() {
            return Err(DiffError::MissingArgument("variable"));
        }
        log::debug!("differentiate: d/d{variable} {node}");

        let expanded = self.inline_calls(node, 0)?;
        let derivative = self.diff(&expanded, variable)?;
        if self.options.simplify {
            Ok(Simplifier::new().simplify(&derivative)?)
        } else {
            Ok(derivative)
        }
    }

    /// Replace every user function call with its instantiated body.
    ///
    /// Bodies may use variables other than their parameters, so calls are expanded
    /// before any subtree is tested for dependence on the variable.
    fn inline_calls(&self, node: &AstNode, depth: usize) -> Result<AstNode, DiffError> {
        match node {
            AstNode::Define { .. } | AstNode::Undefine(_) => Ok(node.clone()),
            AstNode::UserFunction { name, args } => {
                if depth >= MAX_INLINE_DEPTH {
                    return Err(DiffError::NotDifferentiable(node.to_string()));
                }
                let func = self.users.get(name, args.len()).ok_or_else(|| DiffError::UnboundFunction {
                    name: name.clone(),
                    arity: args.len(),
                })?;
                let args = args.iter().map(|a| self.inline_calls(a, depth)).collect::<Result<Vec<_>, _>>()?;
                let body = func.instantiate(&args)?;
                self.inline_calls(&body, depth + 1)
            },
            _ => node.try_map_children(|child| self.inline_calls(child, depth)),
        }
    }

    fn diff(&self, node: &AstNode, var: &str) -> Result<AstNode, DiffError> {
        if !has_derivative(node) {
            return Err(DiffError::NotDifferentiable(node.to_string()));
        }
        if !node.contains_variable(var) {
            return Ok(AstNode::zero());
        }

        match node {
            AstNode::Variable(_) => Ok(AstNode::one()),
            AstNode::Unary { kind: UnaryKind::Negate, expr } => Ok(self.diff(expr, var)?.negative()),
            AstNode::Unary { kind, expr } => self.diff_unary(*kind, expr, var),
            AstNode::Binary { kind, left, right } => self.diff_binary(*kind, left, right, var),
            AstNode::Rational { numerator, denominator } => {
                self.diff_binary(BinaryKind::Div, numerator, denominator, var)
            },
            AstNode::Variadic { kind: VariadicKind::Sum, args } => {
                let args = args.iter().map(|a| self.diff(a, var)).collect::<Result<_, _>>()?;
                Ok(AstNode::Variadic { kind: VariadicKind::Sum, args })
            },
            AstNode::Vector(v) => {
                let elements = v.elements().iter().map(|e| self.diff(e, var)).collect::<Result<_, _>>()?;
                Ok(AstNode::Vector(Vector::new(elements)))
            },
            AstNode::Matrix(m) => {
                let rows = m.rows().iter().map(|r| self.diff(r, var)).collect::<Result<_, _>>()?;
                Ok(AstNode::Matrix(Matrix::new(rows)?))
            },
            AstNode::Derivative { expr, variable } => {
                let inner = self.diff(expr, variable)?;
                self.diff(&inner, var)
            },
            AstNode::Simplify(expr) => self.diff(expr, var),
            _ => Err(DiffError::NotDifferentiable(node.to_string())),
        }
    }

    /// Differentiate a binary node.
    ///
    /// Constant operands are kept as factors rather than differentiated:
    ///
    /// ```text
    /// (u ± c)' = u'          (c ± v)' = ±v'
    /// (c * v)' = c * v'      (u * c)' = c * u'
    /// (u * v)' = u' * v + u * v'
    /// (u / c)' = u' / c
    /// (u / v)' = (u' * v - u * v') / v^2
    /// ```
    fn diff_binary(&self, kind: BinaryKind, l: &AstNode, r: &AstNode, var: &str) -> Result<AstNode, DiffError> {
        let l_const = !l.contains_variable(var);
        let r_const = !r.contains_variable(var);
        let d = |node: &AstNode| self.diff(node, var);

        let node = match kind {
            BinaryKind::Add | BinaryKind::Sub => {
                if l_const {
                    let dr = d(r)?;
                    if kind == BinaryKind::Add { dr } else { dr.negative() }
                } else if r_const {
                    d(l)?
                } else {
                    AstNode::binary(kind, d(l)?, d(r)?)
                }
            },
            BinaryKind::Mul => {
                if l_const {
                    l.clone().mul(d(r)?)
                } else if r_const {
                    r.clone().mul(d(l)?)
                } else {
                    d(l)?.mul(r.clone()).add(l.clone().mul(d(r)?))
                }
            },
            BinaryKind::Div => {
                if r_const {
                    d(l)?.div(r.clone())
                } else if l_const {
                    l.clone().mul(d(r)?).negative().div(r.clone().pow(AstNode::Number(2.0)))
                } else {
                    d(l)?.mul(r.clone())
                        .sub(l.clone().mul(d(r)?))
                        .div(r.clone().pow(AstNode::Number(2.0)))
                }
            },
            BinaryKind::Pow => self.diff_pow(l, r, var)?,
            BinaryKind::Root => {
                if r_const {
                    // root(u, n)' = u' / (n * root(u, n)^(n - 1))
                    let power = AstNode::binary(BinaryKind::Root, l.clone(), r.clone()).pow(minus_one(r));
                    d(l)?.div(r.clone().mul(power))
                } else {
                    self.diff_pow(l, &AstNode::one().div(r.clone()), var)?
                }
            },
            BinaryKind::Log => {
                if l_const {
                    // log(b, u)' = u' / (u * ln(b))
                    d(r)?.div(r.clone().mul(l.clone().ln()))
                } else {
                    self.diff_binary(BinaryKind::Div, &r.clone().ln(), &l.clone().ln(), var)?
                }
            },
            BinaryKind::DotProduct | BinaryKind::CrossProduct => {
                let left = AstNode::binary(kind, d(l)?, r.clone());
                let right = AstNode::binary(kind, l.clone(), d(r)?);
                left.add(right)
            },
            _ => {
                let node = AstNode::binary(kind, l.clone(), r.clone());
                return Err(DiffError::NotDifferentiable(node.to_string()));
            },
        };
        Ok(node)
    }

    /// Differentiate a power expression `u ^ v`.
    ///
    /// ```text
    /// constant exponent:  (u ^ n)' = n * u ^ (n - 1) * u'
    /// constant base:      (a ^ v)' = a ^ v * ln(a) * v'     (e ^ v)' = e ^ v * v'
    /// general:            (u ^ v)' = u ^ v * (v' * ln(u) + v * u' / u)
    /// ```
    fn diff_pow(&self, u: &AstNode, v: &AstNode, var: &str) -> Result<AstNode, DiffError> {
        let u_const = !u.contains_variable(var);
        let v_const = !v.contains_variable(var);

        if v_const {
            let du = self.diff(u, var)?;
            return Ok(v.clone().mul(u.clone().pow(minus_one(v))).mul(du));
        }

        let dv = self.diff(v, var)?;
        let power = u.clone().pow(v.clone());
        if u_const {
            if matches!(u, AstNode::Variable(name) if name == constants::EULER) {
                return Ok(power.mul(dv));
            }
            return Ok(power.mul(u.clone().ln()).mul(dv));
        }

        let du = self.diff(u, var)?;
        Ok(power.mul(dv.mul(u.clone().ln()).add(v.clone().mul(du).div(u.clone()))))
    }

    /// Differentiate a unary function with the chain rule, `f(u)' = f'(u) * u'`.
    ///
    /// - `sin(u)` → `cos(u) * u'`, `cos(u)` → `-sin(u) * u'`
    /// - `tan(u)` → `u' / cos(u)^2`, `cot(u)` → `-u' / sin(u)^2`
    /// - `sec(u)` → `sec(u) * tan(u) * u'`, `csc(u)` → `-csc(u) * cot(u) * u'`
    /// - `arcsin(u)` → `u' / sqrt(1 - u^2)`, `arctan(u)` → `u' / (1 + u^2)`
    /// - `arcsec(u)` → `u' / (abs(u) * sqrt(u^2 - 1))`
    /// - `sinh(u)` → `cosh(u) * u'`, `tanh(u)` → `u' / cosh(u)^2`
    /// - `arsinh(u)` → `u' / sqrt(u^2 + 1)`, `artanh(u)` → `u' / (1 - u^2)`
    /// - `exp(u)` → `exp(u) * u'`, `ln(u)` → `u' / u`, `lg(u)` → `u' / (u * ln(10))`
    /// - `sqrt(u)` → `u' / (2 * sqrt(u))`, `abs(u)` → `u / abs(u) * u'`
    ///
    /// Rounding, complex accessors, converters and matrix functions have no
    /// derivative.
    fn diff_unary(&self, kind: UnaryKind, u: &AstNode, var: &str) -> Result<AstNode, DiffError> {
        use UnaryKind as K;

        let du = self.diff(u, var)?;
        let x = || u.clone();
        let one = AstNode::one;
        let two = || AstNode::Number(2.0);
        let square = || x().pow(two());
        let node = match kind {
            K::Sin => x().cos().mul(du),
            K::Cos => x().sin().negative().mul(du),
            K::Tan => du.div(x().cos().pow(two())),
            K::Cot => du.negative().div(x().sin().pow(two())),
            K::Sec => AstNode::unary(K::Sec, x()).mul(AstNode::unary(K::Tan, x())).mul(du),
            K::Csc => AstNode::unary(K::Csc, x()).mul(AstNode::unary(K::Cot, x())).negative().mul(du),
            K::Arcsin => du.div(one().sub(square()).sqrt()),
            K::Arccos => du.negative().div(one().sub(square()).sqrt()),
            K::Arctan => du.div(one().add(square())),
            K::Arccot => du.negative().div(one().add(square())),
            K::Arcsec => du.div(x().abs().mul(square().sub(one()).sqrt())),
            K::Arccsc => du.negative().div(x().abs().mul(square().sub(one()).sqrt())),
            K::Sinh => x().cosh().mul(du),
            K::Cosh => x().sinh().mul(du),
            K::Tanh => du.div(x().cosh().pow(two())),
            K::Coth => du.negative().div(x().sinh().pow(two())),
            K::Sech => AstNode::unary(K::Sech, x()).mul(AstNode::unary(K::Tanh, x())).negative().mul(du),
            K::Csch => AstNode::unary(K::Csch, x()).mul(AstNode::unary(K::Coth, x())).negative().mul(du),
            K::Arsinh => du.div(square().add(one()).sqrt()),
            K::Arcosh => du.div(square().sub(one()).sqrt()),
            K::Artanh | K::Arcoth => du.div(one().sub(square())),
            K::Arsech => du.negative().div(x().mul(one().sub(square()).sqrt())),
            K::Arcsch => du.negative().div(x().abs().mul(one().add(square()).sqrt())),
            K::Exp => x().exp().mul(du),
            K::Ln => du.div(x()),
            K::Lg => du.div(x().mul(AstNode::Number(10.0).ln())),
            K::Lb => du.div(x().mul(two().ln())),
            K::Sqrt => du.div(two().mul(x().sqrt())),
            K::Abs => x().div(x().abs()).mul(du),
            K::Reciprocal => du.negative().div(square()),
            _ => return Err(DiffError::NotDifferentiable(AstNode::unary(kind, x()).to_string())),
        };
        Ok(node)
    }
}

/// Returns `n - 1`, folded when `n` is a real literal.
fn minus_one(n: &AstNode) -> AstNode {
    match n.as_number() {
        Some(v) => AstNode::Number(v - 1.0),
        None => n.clone().sub(AstNode::one()),
    }
}

/// Returns `false` for node kinds that never have a derivative, even when constant.
fn has_derivative(node: &AstNode) -> bool {
    match node {
        AstNode::Bool(_) => false,
        AstNode::Unary { kind, .. } => *kind != UnaryKind::Not,
        AstNode::Binary { kind, .. } => {
            !(kind.is_relational() || kind.is_bitwise() || matches!(kind, BinaryKind::And | BinaryKind::Or))
        },
        AstNode::Define { .. }
        | AstNode::Undefine(_)
        | AstNode::If { .. }
        | AstNode::For { .. }
        | AstNode::While { .. }
        | AstNode::Increment(_)
        | AstNode::Decrement(_)
        | AstNode::Assign { .. } => false,
        _ => true,
    }
}
