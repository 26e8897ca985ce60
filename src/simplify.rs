//! # simplify.rs
//!
//! Algebraic simplification of expression trees.
//!
//! The [`Simplifier`] rewrites children first and then applies the local rule table
//! to the rebuilt node. Each time a rule fires, its result is simplified again, so
//! the output is a fixed point of the rule table and simplifying twice yields the
//! same tree.
//!
//! Rules, in the order they are tried:
//!
//! - **Constant folding**: arithmetic, `root`, `log`, `mod` and `round` on real or
//!   complex literals, relational and logical operators on literals, negation of
//!   literals, variadic aggregates over real literals.
//! - **Identities**: `x+0`, `x*1`, `x*0`, `x^0`, `x^1`, `1^x`, `x/1`, `0/x`, `x-x`,
//!   `x/x`, `0-x`, `root(x, 1)`, `log(x, x)`, `ln(e)`, `lg(10)`, `lb(2)`.
//! - **Signs**: `-a + b` → `b - a`, `a + -b` → `a - b`, `a - -b` → `a + b`,
//!   `--x` → `x`, `(-a)*(-b)` → `a*b`, `-1*x` → `-x`.
//! - **Canonical order**: `x * c` → `c * x` for a literal `c`.
//! - **Re-association** of a literal with the literal inside a nested operand.
//! - **Like terms**: `c*x + d*x` → `(c+d)*x`, and the subtraction forms.
//! - **Inverse cancellation**: `sin(arcsin(x))`, `arsinh(sinh(x))`, `exp(ln(x))`, ….

use crate::astnode::{AstNode, BinaryKind, UnaryKind, VariadicKind};
use crate::constants;
use crate::error::SimplifyError;
use crate::units::Quantity;
use num_complex::Complex;
use num_traits::Zero;

/// Rewrites expression trees into simpler equivalent trees.
///
/// # Examples
///
/// ```
/// use formulasym::{parse, simplify::Simplifier};
///
/// let node = parse("3x + x * 2").unwrap();
/// let simplified = Simplifier::new().simplify(&node).unwrap();
/// assert_eq!(simplified.to_string(), "5 * x");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplifier;

impl Simplifier {
    pub fn new() -> Self {
        Self
    }

    /// Simplifies a tree.
    ///
    /// # Returns
    ///
    /// * `Ok(AstNode)` - The simplified tree.
    /// * `Err(SimplifyError::DivideByZero)` - If a division, modulo or root by a
    ///   literal zero is found. `0/0` on literals folds to `NaN` instead.
    pub fn simplify(&self, node: &AstNode) -> Result<AstNode, SimplifyError> {
        log::debug!("simplify: {node}");
        self.simplify_node(node)
    }

    fn simplify_node(&self, node: &AstNode) -> Result<AstNode, SimplifyError> {
        let node = node.try_map_children(|child| self.simplify_node(child))?;
        match rewrite(&node)? {
            Some(next) => self.simplify_node(&next),
            None => Ok(node),
        }
    }
}

/// Records a fired rule.
fn fired(rule: &'static str, node: AstNode) -> Option<AstNode> {
    log::trace!("{rule}: -> {node}");
    Some(node)
}

fn num(v: f64) -> AstNode {
    AstNode::Number(v)
}

/// Applies the first matching local rule to a node whose children are simplified.
fn rewrite(node: &AstNode) -> Result<Option<AstNode>, SimplifyError> {
    match node {
        AstNode::Simplify(expr) => Ok(fired("simplify", (**expr).clone())),
        AstNode::Unary { kind, expr } => Ok(fold_unary(*kind, expr)),
        AstNode::Binary { kind, left, right } => fold_binary(*kind, left, right),
        AstNode::Variadic { kind, args } => Ok(fold_variadic(*kind, args)),
        _ => Ok(None),
    }
}

fn fold_unary(kind: UnaryKind, x: &AstNode) -> Option<AstNode> {
    match (kind, x) {
        (UnaryKind::Negate, AstNode::Number(v)) => fired("negate literal", num(-v)),
        (UnaryKind::Negate, AstNode::Complex(c)) => fired("negate literal", AstNode::Complex(-c)),
        (UnaryKind::Negate, AstNode::Quantity(q)) => {
            fired("negate literal", AstNode::Quantity(Quantity::new(-q.value(), q.unit())))
        },
        (UnaryKind::Negate, AstNode::Unary { kind: UnaryKind::Negate, expr }) => {
            fired("double negation", (**expr).clone())
        },
        (UnaryKind::Not, AstNode::Bool(b)) => fired("not literal", AstNode::Bool(!b)),
        (_, AstNode::Unary { kind: inner, expr }) if kind.inverse() == Some(*inner) => {
            fired("inverse cancellation", (**expr).clone())
        },
        (UnaryKind::Ln, AstNode::Variable(name)) if name == constants::EULER => fired("ln(e)", AstNode::one()),
        (UnaryKind::Lg, x) if x.is_number(10.0) => fired("lg(10)", AstNode::one()),
        (UnaryKind::Lb, x) if x.is_number(2.0) => fired("lb(2)", AstNode::one()),
        _ => None,
    }
}

fn fold_binary(kind: BinaryKind, l: &AstNode, r: &AstNode) -> Result<Option<AstNode>, SimplifyError> {
    if let Some(folded) = fold_literals(kind, l, r)? {
        return Ok(fired("constant folding", folded));
    }
    let node = match kind {
        BinaryKind::Add => fold_add(l, r),
        BinaryKind::Sub => fold_sub(l, r),
        BinaryKind::Mul => fold_mul(l, r)?,
        BinaryKind::Div => fold_div(l, r)?,
        BinaryKind::Pow => fold_pow(l, r),
        BinaryKind::Root if r.is_number(1.0) => fired("root(x, 1)", l.clone()),
        BinaryKind::Log if l == r => fired("log(x, x)", AstNode::one()),
        _ => None,
    };
    Ok(node)
}

fn fold_literals(kind: BinaryKind, l: &AstNode, r: &AstNode) -> Result<Option<AstNode>, SimplifyError> {
    match (l, r) {
        (AstNode::Number(a), AstNode::Number(b)) => fold_real(kind, *a, *b),
        (AstNode::Bool(a), AstNode::Bool(b)) => Ok(fold_bool(kind, *a, *b)),
        (AstNode::Complex(a), AstNode::Complex(b)) => fold_complex(kind, *a, *b),
        (AstNode::Number(a), AstNode::Complex(b)) => fold_complex(kind, Complex::from(*a), *b),
        (AstNode::Complex(a), AstNode::Number(b)) => fold_complex(kind, *a, Complex::from(*b)),
        _ => Ok(None),
    }
}

fn fold_real(kind: BinaryKind, a: f64, b: f64) -> Result<Option<AstNode>, SimplifyError> {
    let v = match kind {
        BinaryKind::Add => a + b,
        BinaryKind::Sub => a - b,
        BinaryKind::Mul => a * b,
        BinaryKind::Div => divide(a, b)?,
        BinaryKind::Pow => a.powf(b),
        BinaryKind::Root => {
            if b == 0.0 {
                return Err(SimplifyError::DivideByZero);
            }
            // odd roots of negative numbers stay real
            if a < 0.0 && b.fract() == 0.0 && b % 2.0 != 0.0 {
                -(-a).powf(b.recip())
            } else {
                a.powf(b.recip())
            }
        },
        BinaryKind::Log => b.ln() / a.ln(),
        BinaryKind::Mod => {
            if b == 0.0 {
                return Err(SimplifyError::DivideByZero);
            }
            a - b * (a / b).floor()
        },
        BinaryKind::Round => {
            let scale = 10f64.powi(b as i32);
            (a * scale).round() / scale
        },
        BinaryKind::Less => return Ok(Some(AstNode::Bool(a < b))),
        BinaryKind::LessEqual => return Ok(Some(AstNode::Bool(a <= b))),
        BinaryKind::Greater => return Ok(Some(AstNode::Bool(a > b))),
        BinaryKind::GreaterEqual => return Ok(Some(AstNode::Bool(a >= b))),
        BinaryKind::Equal => return Ok(Some(AstNode::Bool(a == b))),
        BinaryKind::NotEqual => return Ok(Some(AstNode::Bool(a != b))),
        BinaryKind::BitAnd | BinaryKind::BitOr | BinaryKind::Xor | BinaryKind::Nand | BinaryKind::Nor => {
            let (Some(a), Some(b)) = (as_integer(a), as_integer(b)) else {
                return Ok(None);
            };
            let v = match kind {
                BinaryKind::BitAnd => a & b,
                BinaryKind::BitOr => a | b,
                BinaryKind::Xor => a ^ b,
                BinaryKind::Nand => !(a & b),
                _ => !(a | b),
            };
            v as f64
        },
        _ => return Ok(None),
    };
    Ok(Some(num(v)))
}

/// Real division; `0/0` is `NaN`, any other division by zero is an error.
fn divide(a: f64, b: f64) -> Result<f64, SimplifyError> {
    if b != 0.0 {
        Ok(a / b)
    } else if a == 0.0 {
        Ok(f64::NAN)
    } else {
        Err(SimplifyError::DivideByZero)
    }
}

fn as_integer(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

fn fold_bool(kind: BinaryKind, a: bool, b: bool) -> Option<AstNode> {
    let v = match kind {
        BinaryKind::And | BinaryKind::BitAnd => a && b,
        BinaryKind::Or | BinaryKind::BitOr => a || b,
        BinaryKind::Xor | BinaryKind::NotEqual => a != b,
        BinaryKind::Nand => !(a && b),
        BinaryKind::Nor => !(a || b),
        BinaryKind::Implication => !a || b,
        BinaryKind::Equivalence | BinaryKind::Equal => a == b,
        _ => return None,
    };
    Some(AstNode::Bool(v))
}

fn fold_complex(kind: BinaryKind, a: Complex<f64>, b: Complex<f64>) -> Result<Option<AstNode>, SimplifyError> {
    let v = match kind {
        BinaryKind::Add => a + b,
        BinaryKind::Sub => a - b,
        BinaryKind::Mul => a * b,
        BinaryKind::Div if b.is_zero() => {
            if a.is_zero() {
                return Ok(Some(num(f64::NAN)));
            }
            return Err(SimplifyError::DivideByZero);
        },
        BinaryKind::Div => a / b,
        BinaryKind::Pow => a.powc(b),
        BinaryKind::Equal => return Ok(Some(AstNode::Bool(a == b))),
        BinaryKind::NotEqual => return Ok(Some(AstNode::Bool(a != b))),
        _ => return Ok(None),
    };
    Ok(Some(AstNode::Complex(v)))
}

/// Splits a product with a leading real literal into `(coefficient, rest)`.
fn split_coefficient(node: &AstNode) -> (f64, &AstNode) {
    if let AstNode::Binary { kind: BinaryKind::Mul, left, right } = node
        && let Some(c) = left.as_number()
    {
        return (c, right);
    }
    (1.0, node)
}

/// Splits a binary node with exactly one real literal operand into
/// `(kind, literal, other, literal_is_left)`.
fn literal_operand(node: &AstNode) -> Option<(BinaryKind, f64, &AstNode, bool)> {
    let AstNode::Binary { kind, left, right } = node else {
        return None;
    };
    match (left.as_number(), right.as_number()) {
        (Some(c), None) => Some((*kind, c, right, true)),
        (None, Some(c)) => Some((*kind, c, left, false)),
        _ => None,
    }
}

fn negated(node: &AstNode) -> Option<&AstNode> {
    match node {
        AstNode::Unary { kind: UnaryKind::Negate, expr } => Some(expr),
        _ => None,
    }
}

fn is_scalar_literal(node: &AstNode) -> bool {
    matches!(node, AstNode::Number(_) | AstNode::Complex(_))
}

fn fold_add(l: &AstNode, r: &AstNode) -> Option<AstNode> {
    if r.is_number(0.0) {
        return fired("x + 0", l.clone());
    }
    if l.is_number(0.0) {
        return fired("0 + x", r.clone());
    }
    if let Some(a) = negated(l) {
        return fired("-a + b", r.clone().sub(a.clone()));
    }
    if let Some(b) = negated(r) {
        return fired("a + -b", l.clone().sub(b.clone()));
    }
    if let Some(v) = r.as_number()
        && v < 0.0
    {
        return fired("a + negative literal", l.clone().sub(num(-v)));
    }
    if let Some(v) = l.as_number()
        && v < 0.0
    {
        return fired("negative literal + b", r.clone().sub(num(-v)));
    }

    let ((c, x), (d, y)) = (split_coefficient(l), split_coefficient(r));
    if x == y && !is_scalar_literal(x) {
        return fired("like terms", num(c + d).mul(x.clone()));
    }

    // d + (x ± c) and (x ± c) + d
    let (d, inner) = match (l.as_number(), r.as_number()) {
        (None, Some(d)) => (d, l),
        (Some(d), None) => (d, r),
        _ => return None,
    };
    let (kind, c, x, literal_left) = literal_operand(inner)?;
    match (kind, literal_left) {
        (BinaryKind::Add, _) => fired("reassociate add", x.clone().add(num(c + d))),
        (BinaryKind::Sub, false) => fired("reassociate add", x.clone().add(num(d - c))),
        (BinaryKind::Sub, true) => fired("reassociate add", num(c + d).sub(x.clone())),
        _ => None,
    }
}

fn fold_sub(l: &AstNode, r: &AstNode) -> Option<AstNode> {
    if r.is_number(0.0) {
        return fired("x - 0", l.clone());
    }
    if l == r {
        return fired("x - x", AstNode::zero());
    }
    if let Some(b) = negated(r) {
        return fired("a - -b", l.clone().add(b.clone()));
    }
    if l.is_number(0.0) {
        return fired("0 - x", r.clone().negative());
    }
    if let Some(v) = r.as_number()
        && v < 0.0
    {
        return fired("a - negative literal", l.clone().add(num(-v)));
    }

    let ((c, x), (d, y)) = (split_coefficient(l), split_coefficient(r));
    if x == y && !is_scalar_literal(x) {
        return fired("like terms", num(c - d).mul(x.clone()));
    }

    if let Some(d) = r.as_number() {
        let (kind, c, x, literal_left) = literal_operand(l)?;
        return match (kind, literal_left) {
            // (x + c) - d, (c + x) - d
            (BinaryKind::Add, _) => fired("reassociate sub", x.clone().add(num(c - d))),
            // (x - c) - d
            (BinaryKind::Sub, false) => fired("reassociate sub", x.clone().sub(num(c + d))),
            // (c - x) - d
            (BinaryKind::Sub, true) => fired("reassociate sub", num(c - d).sub(x.clone())),
            _ => None,
        };
    }
    if let Some(d) = l.as_number() {
        let (kind, c, x, literal_left) = literal_operand(r)?;
        return match (kind, literal_left) {
            // d - (x + c), d - (c + x)
            (BinaryKind::Add, _) => fired("reassociate sub", num(d - c).sub(x.clone())),
            // d - (x - c)
            (BinaryKind::Sub, false) => fired("reassociate sub", num(d + c).sub(x.clone())),
            // d - (c - x)
            (BinaryKind::Sub, true) => fired("reassociate sub", x.clone().add(num(d - c))),
            _ => None,
        };
    }
    None
}

fn fold_mul(l: &AstNode, r: &AstNode) -> Result<Option<AstNode>, SimplifyError> {
    if l.is_number(0.0) || r.is_number(0.0) {
        return Ok(fired("x * 0", AstNode::zero()));
    }
    if r.is_number(1.0) {
        return Ok(fired("x * 1", l.clone()));
    }
    if l.is_number(1.0) {
        return Ok(fired("1 * x", r.clone()));
    }
    if let (Some(a), Some(b)) = (negated(l), negated(r)) {
        return Ok(fired("(-a) * (-b)", a.clone().mul(b.clone())));
    }
    if l.is_number(-1.0) {
        return Ok(fired("-1 * x", r.clone().negative()));
    }
    if is_scalar_literal(r) && !is_scalar_literal(l) {
        return Ok(fired("canonical order", r.clone().mul(l.clone())));
    }

    let Some(c) = l.as_number() else {
        return Ok(None);
    };
    let Some((kind, d, x, literal_left)) = literal_operand(r) else {
        return Ok(None);
    };
    let node = match (kind, literal_left) {
        // c * (d * x)
        (BinaryKind::Mul, _) => fired("reassociate mul", num(c * d).mul(x.clone())),
        // c * (x / d)
        (BinaryKind::Div, false) => fired("reassociate mul", num(divide(c, d)?).mul(x.clone())),
        // c * (d / x)
        (BinaryKind::Div, true) => fired("reassociate mul", num(c * d).div(x.clone())),
        _ => None,
    };
    Ok(node)
}

fn fold_div(l: &AstNode, r: &AstNode) -> Result<Option<AstNode>, SimplifyError> {
    let zero = match r {
        AstNode::Number(v) => *v == 0.0,
        AstNode::Complex(c) => c.is_zero(),
        _ => false,
    };
    if zero {
        return Err(SimplifyError::DivideByZero);
    }
    if r.is_number(1.0) {
        return Ok(fired("x / 1", l.clone()));
    }
    if l.is_number(0.0) {
        return Ok(fired("0 / x", AstNode::zero()));
    }
    if l == r {
        return Ok(fired("x / x", AstNode::one()));
    }
    if let (Some(a), Some(b)) = (negated(l), negated(r)) {
        return Ok(fired("(-a) / (-b)", a.clone().div(b.clone())));
    }

    if let Some(d) = r.as_number()
        && let Some((kind, c, x, literal_left)) = literal_operand(l)
    {
        let node = match (kind, literal_left) {
            // (c * x) / d
            (BinaryKind::Mul, _) => fired("reassociate div", num(divide(c, d)?).mul(x.clone())),
            // (x / c) / d
            (BinaryKind::Div, false) => fired("reassociate div", x.clone().div(num(c * d))),
            // (c / x) / d
            (BinaryKind::Div, true) => fired("reassociate div", num(divide(c, d)?).div(x.clone())),
            _ => None,
        };
        return Ok(node);
    }
    if let Some(c) = l.as_number()
        && let Some((kind, d, x, literal_left)) = literal_operand(r)
    {
        let node = match (kind, literal_left) {
            // c / (d * x)
            (BinaryKind::Mul, _) => fired("reassociate div", num(divide(c, d)?).div(x.clone())),
            // c / (x / d)
            (BinaryKind::Div, false) => fired("reassociate div", num(c * d).div(x.clone())),
            // c / (d / x)
            (BinaryKind::Div, true) => fired("reassociate div", num(divide(c, d)?).mul(x.clone())),
            _ => None,
        };
        return Ok(node);
    }
    Ok(None)
}

fn fold_pow(base: &AstNode, exp: &AstNode) -> Option<AstNode> {
    if exp.is_number(0.0) {
        fired("x ^ 0", AstNode::one())
    } else if exp.is_number(1.0) {
        fired("x ^ 1", base.clone())
    } else if base.is_number(1.0) {
        fired("1 ^ x", AstNode::one())
    } else {
        None
    }
}

fn fold_variadic(kind: VariadicKind, args: &[AstNode]) -> Option<AstNode> {
    let values = args.iter().map(AstNode::as_number).collect::<Option<Vec<f64>>>()?;
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;
    let squares = || values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();

    let v = match kind {
        VariadicKind::Gcd | VariadicKind::Lcm => {
            let ints = values.iter().map(|v| as_integer(*v)).collect::<Option<Vec<i64>>>()?;
            let (first, rest) = ints.split_first()?;
            let folded = rest.iter().try_fold(*first, |a, &b| match kind {
                VariadicKind::Gcd => Some(gcd(a, b)),
                _ if a == 0 || b == 0 => Some(0),
                // unfolded when the multiple leaves the integer range
                _ => (a / gcd(a, b)).checked_mul(b)?.checked_abs(),
            })?;
            folded as f64
        },
        VariadicKind::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        VariadicKind::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        VariadicKind::Avg => mean,
        VariadicKind::Count => n,
        VariadicKind::Sum => sum,
        VariadicKind::Product => values.iter().product(),
        VariadicKind::Var | VariadicKind::Stdev if values.len() < 2 => return None,
        VariadicKind::Var => squares() / (n - 1.0),
        VariadicKind::Stdev => (squares() / (n - 1.0)).sqrt(),
        VariadicKind::Varp => squares() / n,
        VariadicKind::Stdevp => (squares() / n).sqrt(),
    };
    fired("aggregate", num(v))
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::variable::UserFunctionTable;
    use approx::assert_abs_diff_eq;

    fn ast(input: &str) -> AstNode {
        parse(&tokenize(input).unwrap(), &UserFunctionTable::new()).unwrap()
    }

    fn simplify(input: &str) -> Result<AstNode, SimplifyError> {
        Simplifier::new().simplify(&ast(input))
    }

    fn assert_simplifies(cases: &[(&str, &str)]) {
        for (input, expected) in cases {
            assert_eq!(simplify(input), Ok(ast(expected)), "{input}");
        }
    }

    fn number(input: &str) -> f64 {
        simplify(input).unwrap().as_number().unwrap()
    }

    #[test]
    fn test_identities() {
        assert_simplifies(&[
            ("x + 0", "x"),
            ("0 + x", "x"),
            ("x * 0", "0"),
            ("x * 1", "x"),
            ("x ^ 0", "1"),
            ("x ^ 1", "x"),
            ("1 ^ x", "1"),
            ("x / 1", "x"),
            ("0 / x", "0"),
            ("root(x, 1)", "x"),
            ("x - x", "0"),
            ("x / x", "1"),
            ("x - 0", "x"),
            ("0 - x", "-x"),
            ("sin(x) - sin(x)", "0"),
        ]);
    }

    #[test]
    fn test_signs() {
        assert_simplifies(&[
            ("-a + b", "b - a"),
            ("a + -b", "a - b"),
            ("a - -b", "a + b"),
            ("--x", "x"),
            ("-(-(3))", "3"),
            ("(-a) * (-b)", "a * b"),
            ("(-a) / (-b)", "a / b"),
            ("-1 * x", "-x"),
            ("x * -1", "-x"),
            ("x + (-3)", "x - 3"),
            ("x - (-3)", "x + 3"),
            ("-(2 m)", "-2 m"),
        ]);
    }

    #[test]
    fn test_canonical_order_and_reassociation() {
        assert_simplifies(&[
            ("x * 3", "3 * x"),
            ("x * 3 * 2", "6 * x"),
            ("2 * (3 * x)", "6 * x"),
            ("(x + 2) + 3", "x + 5"),
            ("3 + (2 + x)", "x + 5"),
            ("(x - 2) + 5", "x + 3"),
            ("(2 - x) + 3", "5 - x"),
            ("(x + 2) - 5", "x - 3"),
            ("(x - 2) - 3", "x - 5"),
            ("(2 - x) - 3", "-1 - x"),
            ("5 - (x + 2)", "3 - x"),
            ("3 - (x - 2)", "5 - x"),
            ("3 - (5 - x)", "x - 2"),
            ("(6 * x) / 2", "3 * x"),
            ("(x / 2) / 3", "x / 6"),
            ("(6 / x) / 2", "3 / x"),
            ("6 / (2 * x)", "3 / x"),
            ("6 / (x / 2)", "12 / x"),
            ("6 / (2 / x)", "3 * x"),
            ("2 * (x / 4)", "0.5 * x"),
            ("2 * (3 / x)", "6 / x"),
        ]);
    }

    #[test]
    fn test_reassociation_families() {
        // additive: {5 + I, I + 5, 5 - I, I - 5} for I in {x + 2, x - 2, 2 - x}
        assert_simplifies(&[
            ("5 + (x + 2)", "x + 7"),
            ("5 + (x - 2)", "x + 3"),
            ("5 + (2 - x)", "7 - x"),
            ("(x + 2) + 5", "x + 7"),
            ("(x - 2) + 5", "x + 3"),
            ("(2 - x) + 5", "7 - x"),
            ("5 - (x + 2)", "3 - x"),
            ("5 - (x - 2)", "7 - x"),
            ("5 - (2 - x)", "x + 3"),
            ("(x + 2) - 5", "x - 3"),
            ("(x - 2) - 5", "x - 7"),
            ("(2 - x) - 5", "-3 - x"),
        ]);
        // multiplicative: {6 * I, I * 6, 6 / I, I / 2} for I in {2 * x, x / 2, 2 / x}
        assert_simplifies(&[
            ("6 * (2 * x)", "12 * x"),
            ("6 * (x / 2)", "3 * x"),
            ("6 * (2 / x)", "12 / x"),
            ("(2 * x) * 6", "12 * x"),
            ("(x / 2) * 6", "3 * x"),
            ("(2 / x) * 6", "12 / x"),
            ("6 / (2 * x)", "3 / x"),
            ("6 / (x / 2)", "12 / x"),
            ("6 / (2 / x)", "3 * x"),
            ("(6 * x) / 2", "3 * x"),
            ("(x / 6) / 2", "x / 12"),
            ("(6 / x) / 2", "3 / x"),
        ]);
        // the literal may sit on either side of a commutative inner node
        assert_simplifies(&[("5 + (2 + x)", "x + 7"), ("(2 + x) - 5", "x - 3"), ("6 * (x * 2)", "12 * x")]);
    }

    #[test]
    fn test_like_terms() {
        assert_simplifies(&[
            ("x + x", "2 * x"),
            ("3x + x", "4 * x"),
            ("x + 3x", "4 * x"),
            ("2x + 3x", "5 * x"),
            ("3x - x", "2 * x"),
            ("x - 3x", "-2 * x"),
            ("5x - 2x", "3 * x"),
            ("2x - 2x", "0"),
            ("sin(y) + sin(y)", "2 * sin(y)"),
        ]);
    }

    #[test]
    fn test_inverse_cancellation() {
        let x = AstNode::variable("x");
        for kind in UnaryKind::ALL {
            let Some(inverse) = kind.inverse() else {
                continue;
            };
            let node = AstNode::unary(*kind, AstNode::unary(inverse, x.clone()));
            assert_eq!(Simplifier::new().simplify(&node), Ok(x.clone()), "{node}");
        }
        assert_simplifies(&[
            ("exp(ln(x))", "x"),
            ("ln(exp(x))", "x"),
            ("sin(arcsin(x))", "x"),
            ("arcosh(cosh(x))", "x"),
            ("log(x, x)", "1"),
            ("ln(e)", "1"),
            ("lg(10)", "1"),
            ("lb(2)", "1"),
        ]);
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(number("2 + 3 * 4"), 14.0);
        assert_eq!(number("2 ^ 10"), 1024.0);
        assert_eq!(number("7 mod 3"), 1.0);
        assert_eq!(number("-7 mod 3"), 2.0);
        assert_eq!(number("round(2.375, 2)"), 2.38);
        assert_eq!(number("12 & 10"), 8.0);
        assert_eq!(number("12 | 3"), 15.0);
        assert_abs_diff_eq!(number("root(-8, 3)"), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(number("log(2, 8)"), 3.0, epsilon = 1e-12);

        assert_eq!(simplify("(1+2i) * (1-2i)"), Ok(AstNode::Complex(Complex::new(5.0, 0.0))));
        assert_eq!(simplify("2 + 3i"), Ok(ast("2+3i")));
        assert_eq!(simplify("1 < 2"), Ok(AstNode::Bool(true)));
        assert_eq!(simplify("1 == 2"), Ok(AstNode::Bool(false)));
        assert_eq!(simplify("true && false"), Ok(AstNode::Bool(false)));
        assert_eq!(simplify("true -> false"), Ok(AstNode::Bool(false)));
        assert_eq!(simplify("not true"), Ok(AstNode::Bool(false)));
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(number("max(1, 5, 3)"), 5.0);
        assert_eq!(number("min(4, -1)"), -1.0);
        assert_eq!(number("avg(1, 2, 3)"), 2.0);
        assert_eq!(number("count(7, 7, 7)"), 3.0);
        assert_eq!(number("sum(1, 2, 3)"), 6.0);
        assert_eq!(number("product(2, 3, 4)"), 24.0);
        assert_eq!(number("gcd(12, 18)"), 6.0);
        assert_eq!(number("lcm(4, 6)"), 12.0);
        assert_abs_diff_eq!(number("stdevp(2, 4, 4, 4, 5, 5, 7, 9)"), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(number("var(1, 2, 3, 4)"), 5.0 / 3.0, epsilon = 1e-12);
        assert!(matches!(simplify("var(1)"), Ok(AstNode::Variadic { .. })));
        assert!(matches!(simplify("max(x, 1)"), Ok(AstNode::Variadic { .. })));
    }

    #[test]
    fn test_lcm_out_of_range() {
        assert!(matches!(
            simplify("lcm(4611686018427387904, 3)"),
            Ok(AstNode::Variadic { kind: VariadicKind::Lcm, .. }),
        ));
        assert_eq!(number("lcm(4611686018427387904, 2)"), 4611686018427387904.0);
        assert_eq!(number("lcm(-4, 6)"), 12.0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(simplify("1 / 0"), Err(SimplifyError::DivideByZero));
        assert_eq!(simplify("x / 0"), Err(SimplifyError::DivideByZero));
        assert_eq!(simplify("x / (1 - 1)"), Err(SimplifyError::DivideByZero));
        assert_eq!(simplify("i / 0"), Err(SimplifyError::DivideByZero));
        assert_eq!(simplify("5 mod 0"), Err(SimplifyError::DivideByZero));
        assert!(matches!(simplify("0 / 0"), Ok(AstNode::Number(v)) if v.is_nan()));

        let folded = simplify("0 / 0").unwrap();
        assert_eq!(simplify(&folded.to_string()), Ok(folded));
    }

    #[test]
    fn test_meta_nodes() {
        assert_simplifies(&[
            ("simplify(x + 0)", "x"),
            ("derivative(x * 1, x)", "derivative(x, x)"),
            ("{1 + 1, x * 1}", "{2, x}"),
            ("{{1 + 1, 2}, {3, x - x}}", "{{2, 2}, {3, 0}}"),
            ("if(1 < 2, x + 0, 3)", "if(true, x, 3)"),
            ("f(2 * 3)", "f(6)"),
        ]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn small_number() -> impl Strategy<Value = AstNode> {
        (-3i32..4).prop_map(|v| AstNode::Number(v as f64))
    }

    fn arb_node() -> impl Strategy<Value = AstNode> {
        let leaf = prop_oneof![
            small_number(),
            prop::sample::select(vec!["x", "y"]).prop_map(AstNode::variable),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            let binary = prop::sample::select(vec![
                BinaryKind::Add,
                BinaryKind::Sub,
                BinaryKind::Mul,
                BinaryKind::Div,
                BinaryKind::Pow,
            ]);
            let unary = prop::sample::select(vec![
                UnaryKind::Negate,
                UnaryKind::Sin,
                UnaryKind::Arcsin,
                UnaryKind::Exp,
                UnaryKind::Ln,
            ]);
            prop_oneof![
                (binary, inner.clone(), inner.clone()).prop_map(|(k, l, r)| AstNode::binary(k, l, r)),
                (unary, inner).prop_map(|(k, e)| AstNode::unary(k, e)),
            ]
        })
    }

    proptest! {
        #[test]
        fn simplify_is_idempotent(node in arb_node()) {
            let simplifier = Simplifier::new();
            if let Ok(once) = simplifier.simplify(&node) {
                prop_assert_eq!(simplifier.simplify(&once), Ok(once.clone()));
            }
        }

        #[test]
        fn simplify_keeps_constants_constant(node in arb_node()) {
            if let Ok(once) = Simplifier::new().simplify(&node) {
                prop_assert!(node.contains_variable("x") || !once.contains_variable("x"));
            }
        }
    }
}
