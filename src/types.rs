//! # types.rs
//!
//! Static result-type analysis of expression trees.
//!
//! [`TypeAnalyzer::result_type`] walks a tree bottom-up and reports the type the node
//! would evaluate to. A free variable has type [`ResultType::Undefined`], which
//! propagates through every operator: the check is deferred to evaluation time
//! rather than treated as an error.

use crate::astnode::{AstNode, BinaryKind, UnaryKind, VariadicKind};
use crate::constants;
use crate::error::TypeMismatchError;
use crate::units::Dimension;
use crate::variable::Parameters;
use std::fmt;

/// The type tag of an evaluated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Number,
    Boolean,
    ComplexNumber,
    RationalNumber,
    Vector,
    Matrix,
    String,
    Expression,
    /// Depends on a free variable; decided at evaluation time.
    Undefined,
    AngleNumber,
    PowerNumber,
    TemperatureNumber,
    MassNumber,
    LengthNumber,
    TimeNumber,
    AreaNumber,
    VolumeNumber,
}

impl ResultType {
    /// Every result type, in declaration order.
    pub const ALL: &'static [ResultType] = &[
        Self::Number,
        Self::Boolean,
        Self::ComplexNumber,
        Self::RationalNumber,
        Self::Vector,
        Self::Matrix,
        Self::String,
        Self::Expression,
        Self::Undefined,
        Self::AngleNumber,
        Self::PowerNumber,
        Self::TemperatureNumber,
        Self::MassNumber,
        Self::LengthNumber,
        Self::TimeNumber,
        Self::AreaNumber,
        Self::VolumeNumber,
    ];

    /// Returns `true` for the eight physical-quantity types.
    pub fn is_quantity(&self) -> bool {
        matches!(
            self,
            Self::AngleNumber | Self::PowerNumber | Self::TemperatureNumber | Self::MassNumber
                | Self::LengthNumber | Self::TimeNumber | Self::AreaNumber | Self::VolumeNumber
        )
    }
}

impl From<Dimension> for ResultType {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Angle => Self::AngleNumber,
            Dimension::Power => Self::PowerNumber,
            Dimension::Temperature => Self::TemperatureNumber,
            Dimension::Mass => Self::MassNumber,
            Dimension::Length => Self::LengthNumber,
            Dimension::Time => Self::TimeNumber,
            Dimension::Area => Self::AreaNumber,
            Dimension::Volume => Self::VolumeNumber,
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Computes result types of expression trees.
///
/// A variable resolves through the optional [`Parameters`] table, then through the
/// named constants; any other variable is [`ResultType::Undefined`].
///
/// # Examples
///
/// ```
/// use formulasym::{parse, types::{ResultType, TypeAnalyzer}};
///
/// let node = parse("2 * {1, 2}").unwrap();
/// assert_eq!(TypeAnalyzer::new().result_type(&node), Ok(ResultType::Vector));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeAnalyzer<'a> {
    params: Option<&'a Parameters>,
}

impl<'a> TypeAnalyzer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an analyzer that types bound variables from `params`.
    pub fn with_parameters(params: &'a Parameters) -> Self {
        Self { params: Some(params) }
    }

    /// Returns the result type of `node`.
    ///
    /// # Returns
    ///
    /// * `Ok(ResultType)` - The type of the node; `Undefined` when it depends on a
    ///   free variable.
    /// * `Err(TypeMismatchError)` - When some node in the tree receives operand types
    ///   it does not accept.
    pub fn result_type(&self, node: &AstNode) -> Result<ResultType, TypeMismatchError> {
        use ResultType as T;

        let ty = match node {
            AstNode::Number(_) => T::Number,
            AstNode::Bool(_) => T::Boolean,
            AstNode::Complex(_) => T::ComplexNumber,
            AstNode::Quantity(q) => T::from(q.dimension()),
            AstNode::Variable(name) => self.variable_type(name),
            AstNode::Rational { numerator, denominator } => {
                let left = self.result_type(numerator)?;
                let right = self.result_type(denominator)?;
                match (left, right) {
                    (T::Undefined, _) | (_, T::Undefined) => T::Undefined,
                    (T::Number, T::Number) => T::RationalNumber,
                    _ => return Err(binary_mismatch("//", left, right)),
                }
            },
            AstNode::Unary { kind, expr } => {
                let operand = self.result_type(expr)?;
                if operand == T::Undefined {
                    return Ok(T::Undefined);
                }
                unary_type(*kind, operand).ok_or_else(|| TypeMismatchError::ParameterTypeMismatch {
                    node: kind.name().to_string(),
                    found: operand,
                })?
            },
            AstNode::Binary { kind, left, right } => {
                let left = self.result_type(left)?;
                let right = self.result_type(right)?;
                if left == T::Undefined || right == T::Undefined {
                    return Ok(T::Undefined);
                }
                binary_type(*kind, left, right).ok_or_else(|| binary_mismatch(kind.symbol(), left, right))?
            },
            AstNode::Variadic { kind, args } => self.variadic_type(*kind, args)?,
            AstNode::Vector(v) => {
                self.homogeneous("vector", v.elements(), |t| {
                    matches!(t, T::Number | T::ComplexNumber | T::RationalNumber | T::Undefined) || t.is_quantity()
                })?;
                T::Vector
            },
            AstNode::Matrix(m) => {
                self.homogeneous("matrix", m.rows(), |t| matches!(t, T::Vector | T::Undefined))?;
                T::Matrix
            },
            AstNode::UserFunction { args, .. } => {
                for arg in args {
                    self.result_type(arg)?;
                }
                T::Undefined
            },
            AstNode::Define { value, .. } => {
                self.result_type(value)?;
                T::String
            },
            AstNode::Undefine(_) => T::String,
            AstNode::If { condition, then, otherwise } => {
                self.condition("if", condition)?;
                self.result_type(then)?;
                if let Some(otherwise) = otherwise {
                    self.result_type(otherwise)?;
                }
                T::Undefined
            },
            AstNode::For { init, condition, iteration, body } => {
                self.result_type(init)?;
                self.condition("for", condition)?;
                self.result_type(iteration)?;
                self.result_type(body)?;
                T::Undefined
            },
            AstNode::While { condition, body } => {
                self.condition("while", condition)?;
                self.result_type(body)?;
                T::Undefined
            },
            AstNode::Increment(target) => self.numeric_target("++", target)?,
            AstNode::Decrement(target) => self.numeric_target("--", target)?,
            AstNode::Assign { kind, value, .. } => self.numeric_target(kind.symbol(), value)?,
            AstNode::Simplify(_) | AstNode::Derivative { .. } => T::Expression,
        };
        Ok(ty)
    }

    fn variable_type(&self, name: &str) -> ResultType {
        if let Some(value) = self.params.and_then(|p| p.get(name)) {
            value.result_type()
        } else if constants::contains(name) {
            ResultType::Number
        } else {
            ResultType::Undefined
        }
    }

    /// Checks that every item has an accepted type.
    fn homogeneous<F>(&self, node: &str, items: &[AstNode], accepts: F) -> Result<(), TypeMismatchError>
    where
        F: Fn(ResultType) -> bool,
    {
        for (i, item) in items.iter().enumerate() {
            let found = self.result_type(item)?;
            if !accepts(found) {
                return Err(TypeMismatchError::DifferentParameterTypeMismatch {
                    node: node.to_string(),
                    position: i + 1,
                    found,
                });
            }
        }
        Ok(())
    }

    fn variadic_type(&self, kind: VariadicKind, args: &[AstNode]) -> Result<ResultType, TypeMismatchError> {
        let mut common = None;
        let mut undefined = false;
        for (i, arg) in args.iter().enumerate() {
            let found = self.result_type(arg)?;
            match (found, common) {
                (ResultType::Undefined, _) => undefined = true,
                (_, None) => common = Some(found),
                (_, Some(first)) if first != found => {
                    return Err(TypeMismatchError::DifferentParameterTypeMismatch {
                        node: kind.name().to_string(),
                        position: i + 1,
                        found,
                    });
                },
                _ => {},
            }
        }

        match common {
            Some(ResultType::Number) | None => {},
            Some(ResultType::Vector) if args.len() == 1 => {},
            Some(found) => {
                return Err(TypeMismatchError::ParameterTypeMismatch { node: kind.name().to_string(), found });
            },
        }
        Ok(if undefined { ResultType::Undefined } else { ResultType::Number })
    }

    fn condition(&self, node: &str, condition: &AstNode) -> Result<(), TypeMismatchError> {
        match self.result_type(condition)? {
            ResultType::Boolean | ResultType::Undefined => Ok(()),
            found => Err(TypeMismatchError::ParameterTypeMismatch { node: node.to_string(), found }),
        }
    }

    fn numeric_target(&self, node: &str, operand: &AstNode) -> Result<ResultType, TypeMismatchError> {
        match self.result_type(operand)? {
            ResultType::Number | ResultType::Undefined => Ok(ResultType::Number),
            found => Err(TypeMismatchError::ParameterTypeMismatch { node: node.to_string(), found }),
        }
    }
}

fn binary_mismatch(node: &str, left: ResultType, right: ResultType) -> TypeMismatchError {
    TypeMismatchError::BinaryParameterTypeMismatch { node: node.to_string(), left, right }
}

/// Result of a unary node for a defined operand type, `None` on mismatch.
fn unary_type(kind: UnaryKind, t: ResultType) -> Option<ResultType> {
    use ResultType as T;
    use UnaryKind as K;

    let q = t.is_quantity();
    let ty = match kind {
        K::Negate if q || matches!(t, T::Number | T::ComplexNumber | T::RationalNumber | T::Vector | T::Matrix) => t,
        K::Factorial if t == T::Number => T::Number,
        K::Not if matches!(t, T::Number | T::Boolean) => t,
        K::Abs => match t {
            T::Number | T::ComplexNumber | T::Vector => T::Number,
            T::RationalNumber => T::RationalNumber,
            _ if q => t,
            _ => return None,
        },
        K::Ceil | K::Floor | K::Round | K::Trunc | K::Frac if t == T::Number || q => t,
        K::Sign if t == T::Number || q => T::Number,
        K::Exp | K::Ln | K::Lg | K::Lb | K::Sqrt if matches!(t, T::Number | T::ComplexNumber) => t,
        _ if kind.is_trigonometric() => match t {
            T::Number | T::AngleNumber => T::Number,
            T::ComplexNumber => T::ComplexNumber,
            _ => return None,
        },
        _ if kind.is_inverse_trigonometric() => match t {
            T::Number => T::AngleNumber,
            T::ComplexNumber => T::ComplexNumber,
            _ => return None,
        },
        _ if kind.is_hyperbolic() && matches!(t, T::Number | T::ComplexNumber) => t,
        K::Re | K::Im | K::Phase if t == T::ComplexNumber => T::Number,
        K::Conjugate | K::Reciprocal if t == T::ComplexNumber => T::ComplexNumber,
        K::ToDeg | K::ToRad | K::ToGrad if matches!(t, T::Number | T::AngleNumber) => T::AngleNumber,
        K::ToNumber if q => T::Number,
        K::ToBin | K::ToOct | K::ToHex if t == T::Number => T::String,
        K::Transpose if matches!(t, T::Vector | T::Matrix) => T::Matrix,
        K::Det if t == T::Matrix => T::Number,
        K::Inverse if t == T::Matrix => T::Matrix,
        _ => return None,
    };
    Some(ty)
}

/// Result of a binary node for defined operand types, `None` on mismatch.
fn binary_type(kind: BinaryKind, l: ResultType, r: ResultType) -> Option<ResultType> {
    use BinaryKind as K;
    use ResultType as T;

    let ty = match kind {
        K::Add | K::Sub => match (l, r) {
            (T::String, T::String) if kind == K::Add => T::String,
            (T::Vector, T::Vector) => T::Vector,
            (T::Matrix, T::Matrix) => T::Matrix,
            _ if l == r && l.is_quantity() => l,
            _ => scalar_type(l, r)?,
        },
        K::Mul => match (l, r) {
            (T::LengthNumber, T::LengthNumber) => T::AreaNumber,
            (T::LengthNumber, T::AreaNumber) | (T::AreaNumber, T::LengthNumber) => T::VolumeNumber,
            (T::Number, T::Vector) | (T::Vector, T::Number) => T::Vector,
            (T::Number, T::Matrix) | (T::Matrix, T::Number) | (T::Matrix, T::Matrix)
            | (T::Matrix, T::Vector) | (T::Vector, T::Matrix) => T::Matrix,
            _ => scalar_type(l, r)?,
        },
        K::Div => match (l, r) {
            _ if l == r && l.is_quantity() => T::Number,
            (T::Vector, T::Number) => T::Vector,
            (T::Matrix, T::Number) => T::Matrix,
            (_, T::Number) if l.is_quantity() => l,
            (T::Number, _) if r.is_quantity() => return None,
            _ => scalar_type(l, r)?,
        },
        K::Pow => match (l, r) {
            (T::Matrix, T::Number) => T::Matrix,
            (T::Number, T::Number) => T::Number,
            _ if complex_pair(l, r) => T::ComplexNumber,
            _ => return None,
        },
        K::Root | K::Mod | K::Round => match (l, r) {
            (T::Number, T::Number) => T::Number,
            _ => return None,
        },
        K::Log => match (l, r) {
            (T::Number, T::Number) => T::Number,
            (T::Number, T::ComplexNumber) => T::ComplexNumber,
            _ => return None,
        },
        K::Less | K::LessEqual | K::Greater | K::GreaterEqual => match (l, r) {
            (T::Number, T::Number) => T::Boolean,
            _ if l == r && l.is_quantity() => T::Boolean,
            _ => return None,
        },
        K::Equal | K::NotEqual => match (l, r) {
            (T::Number, T::Number) | (T::Boolean, T::Boolean) | (T::ComplexNumber, T::ComplexNumber) => T::Boolean,
            _ if l == r && l.is_quantity() => T::Boolean,
            _ => return None,
        },
        K::BitAnd | K::BitOr | K::Xor | K::Nand | K::Nor | K::Implication | K::Equivalence => match (l, r) {
            (T::Number, T::Number) => T::Number,
            (T::Boolean, T::Boolean) => T::Boolean,
            _ => return None,
        },
        K::And | K::Or => match (l, r) {
            (T::Boolean, T::Boolean) => T::Boolean,
            _ => return None,
        },
        K::DotProduct => match (l, r) {
            (T::Vector, T::Vector) => T::Number,
            _ => return None,
        },
        K::CrossProduct => match (l, r) {
            (T::Vector, T::Vector) => T::Vector,
            _ => return None,
        },
    };
    Some(ty)
}

/// Returns `true` if both operands are real or complex and at least one is complex.
fn complex_pair(l: ResultType, r: ResultType) -> bool {
    use ResultType as T;
    matches!(
        (l, r),
        (T::ComplexNumber, T::ComplexNumber) | (T::Number, T::ComplexNumber) | (T::ComplexNumber, T::Number)
    )
}

/// Shared arithmetic table: real, complex, rational, and a quantity scaled by a number.
fn scalar_type(l: ResultType, r: ResultType) -> Option<ResultType> {
    use ResultType as T;
    let ty = match (l, r) {
        (T::Number, T::Number) => T::Number,
        _ if complex_pair(l, r) => T::ComplexNumber,
        (T::RationalNumber, T::RationalNumber | T::Number) | (T::Number, T::RationalNumber) => T::RationalNumber,
        (T::Number, _) if r.is_quantity() => r,
        (_, T::Number) if l.is_quantity() => l,
        _ => return None,
    };
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::units::{Quantity, Unit};
    use crate::variable::{UserFunctionTable, Value};
    use ResultType as T;

    fn type_of(input: &str) -> Result<ResultType, TypeMismatchError> {
        let node = parse(&tokenize(input).unwrap(), &UserFunctionTable::new()).unwrap();
        TypeAnalyzer::new().result_type(&node)
    }

    #[test]
    fn test_table() {
        let cases = [
            ("1 + 2", T::Number),
            ("1 + 2i", T::ComplexNumber),
            ("1//2 + 3", T::RationalNumber),
            ("5 m + 2 m", T::LengthNumber),
            ("2 * 5 kg", T::MassNumber),
            ("3 m * 2 m", T::AreaNumber),
            ("3 m * 2 m^2", T::VolumeNumber),
            ("6 s / 2 s", T::Number),
            ("6 s / 2", T::TimeNumber),
            ("2 * {1, 2}", T::Vector),
            ("{1, 2} / 2", T::Vector),
            ("{{1,2},{3,4}} * {1, 2}", T::Matrix),
            ("{{1,2},{3,4}} ^ 2", T::Matrix),
            ("2 ^ 0.5", T::Number),
            ("i ^ 2", T::ComplexNumber),
            ("log(2, i)", T::ComplexNumber),
            ("root(8, 3)", T::Number),
            ("1 < 2", T::Boolean),
            ("1 m <= 2 m", T::Boolean),
            ("true == false", T::Boolean),
            ("i != 2i", T::Boolean),
            ("3 & 5", T::Number),
            ("true xor false", T::Boolean),
            ("true && false", T::Boolean),
            ("-(2 m)", T::LengthNumber),
            ("5!", T::Number),
            ("not true", T::Boolean),
            ("abs(3-4i)", T::Number),
            ("abs({3, 4})", T::Number),
            ("floor(2.5 h)", T::TimeNumber),
            ("sign(-3 K)", T::Number),
            ("sqrt(i)", T::ComplexNumber),
            ("sin(90 deg)", T::Number),
            ("arcsin(1)", T::AngleNumber),
            ("cosh(i)", T::ComplexNumber),
            ("re(3-4i)", T::Number),
            ("conjugate(i)", T::ComplexNumber),
            ("todeg(1)", T::AngleNumber),
            ("tonumber(3 kg)", T::Number),
            ("tohex(255)", T::String),
            ("transpose({1, 2})", T::Matrix),
            ("det({{1,2},{3,4}})", T::Number),
            ("inverse({{1,2},{3,4}})", T::Matrix),
            ("dotproduct({1,2},{3,4})", T::Number),
            ("crossproduct({1,2,3},{4,5,6})", T::Vector),
            ("max(1, 2, 3)", T::Number),
            ("sum({1, 2, 3})", T::Number),
            ("pi * 2", T::Number),
            ("x := 3", T::String),
            ("undef(x)", T::String),
            ("x++", T::Number),
            ("x += 2", T::Number),
            ("if(x > 1, 2, 3)", T::Undefined),
            ("while(x < 3, x++)", T::Undefined),
            ("simplify(x + x)", T::Expression),
            ("derivative(x^2, x)", T::Expression),
        ];
        for (input, expected) in cases {
            assert_eq!(type_of(input), Ok(expected), "{input}");
        }
    }

    #[test]
    fn test_undefined_propagates() {
        assert_eq!(type_of("x + 1"), Ok(T::Undefined));
        assert_eq!(type_of("sin(x) * 5 kg"), Ok(T::Undefined));
        assert_eq!(type_of("max(1, x)"), Ok(T::Undefined));
        assert_eq!(type_of("f(1, 2)"), Ok(T::Undefined));
        assert_eq!(type_of("{x, 1}"), Ok(T::Vector));
        assert_eq!(type_of("x//2"), Ok(T::Undefined));
        assert_eq!(type_of("3//y"), Ok(T::Undefined));
        assert_eq!(type_of("3//2"), Ok(T::RationalNumber));
    }

    #[test]
    fn test_mismatches() {
        assert_eq!(
            type_of("90 deg + 5 W"),
            Err(TypeMismatchError::BinaryParameterTypeMismatch {
                node: "+".into(),
                left: T::AngleNumber,
                right: T::PowerNumber,
            }),
        );
        assert!(matches!(type_of("true & 1"), Err(TypeMismatchError::BinaryParameterTypeMismatch { .. })));
        assert!(matches!(type_of("1 && 2"), Err(TypeMismatchError::BinaryParameterTypeMismatch { .. })));
        assert!(matches!(type_of("2 / 3 m"), Err(TypeMismatchError::BinaryParameterTypeMismatch { .. })));
        assert_eq!(
            type_of("5 kg!"),
            Err(TypeMismatchError::ParameterTypeMismatch { node: "!".into(), found: T::MassNumber }),
        );
        assert!(matches!(type_of("re(2)"), Err(TypeMismatchError::ParameterTypeMismatch { .. })));
        assert_eq!(
            type_of("max(1, 2i)"),
            Err(TypeMismatchError::DifferentParameterTypeMismatch {
                node: "max".into(),
                position: 2,
                found: T::ComplexNumber,
            }),
        );
        assert_eq!(
            type_of("min(2i, 3i)"),
            Err(TypeMismatchError::ParameterTypeMismatch { node: "min".into(), found: T::ComplexNumber }),
        );
        assert!(matches!(type_of("sum({1}, {2})"), Err(TypeMismatchError::ParameterTypeMismatch { .. })));
        assert!(matches!(
            type_of("{1, true}"),
            Err(TypeMismatchError::DifferentParameterTypeMismatch { position: 2, .. }),
        ));
        assert!(matches!(
            type_of("matrix{x, 1}"),
            Err(TypeMismatchError::DifferentParameterTypeMismatch { position: 2, .. }),
        ));
        assert!(matches!(type_of("if(1, 2)"), Err(TypeMismatchError::ParameterTypeMismatch { .. })));
        assert!(matches!(type_of("x += true"), Err(TypeMismatchError::ParameterTypeMismatch { .. })));
        assert!(matches!(type_of("true//2"), Err(TypeMismatchError::BinaryParameterTypeMismatch { .. })));
    }

    #[test]
    fn test_parameters() {
        let params = crate::variable::Parameters::from([
            ("x", Value::Number(1.0)),
            ("q", Value::Quantity(Quantity::new(2.0, Unit::Meter))),
            ("s", Value::String("hi".into())),
        ]);
        let analyzer = TypeAnalyzer::with_parameters(&params);
        let node = |s: &str| parse(&tokenize(s).unwrap(), &UserFunctionTable::new()).unwrap();

        assert_eq!(analyzer.result_type(&node("x + 1")), Ok(T::Number));
        assert_eq!(analyzer.result_type(&node("q * q")), Ok(T::AreaNumber));
        assert_eq!(analyzer.result_type(&node("s + s")), Ok(T::String));
        assert_eq!(analyzer.result_type(&node("y + 1")), Ok(T::Undefined));
    }

    fn samples() -> Vec<AstNode> {
        let mut nodes = vec![
            AstNode::Number(1.0),
            AstNode::Bool(true),
            AstNode::Complex(num_complex::Complex::new(0.0, 1.0)),
            AstNode::rational(AstNode::one(), AstNode::Number(2.0)),
            AstNode::vector(vec![AstNode::one()]),
            AstNode::Define { target: Box::new(AstNode::variable("s")), value: Box::new(AstNode::one()) },
            AstNode::Simplify(Box::new(AstNode::variable("x"))),
            AstNode::variable("x"),
        ];
        let units = [
            Unit::Degree, Unit::Watt, Unit::Kelvin, Unit::Gram,
            Unit::Meter, Unit::Second, Unit::SquareMeter, Unit::Liter,
        ];
        nodes.extend(units.iter().map(|u| AstNode::Quantity(Quantity::new(1.0, *u))));
        nodes
    }

    #[test]
    fn test_totality() {
        let analyzer = TypeAnalyzer::new();
        let samples = samples();
        for kind in BinaryKind::ALL {
            for left in &samples {
                for right in &samples {
                    let node = AstNode::binary(*kind, left.clone(), right.clone());
                    match analyzer.result_type(&node) {
                        Ok(ty) => assert!(ResultType::ALL.contains(&ty)),
                        Err(err) => assert!(
                            matches!(err, TypeMismatchError::BinaryParameterTypeMismatch { .. }),
                            "{node}: {err}",
                        ),
                    }
                }
            }
        }
        for kind in UnaryKind::ALL {
            for operand in &samples {
                let node = AstNode::unary(*kind, operand.clone());
                if let Err(err) = analyzer.result_type(&node) {
                    assert!(matches!(err, TypeMismatchError::ParameterTypeMismatch { .. }), "{node}: {err}");
                }
            }
        }
    }

    const QUANTITIES: [ResultType; 8] = [
        T::AngleNumber, T::PowerNumber, T::TemperatureNumber, T::MassNumber,
        T::LengthNumber, T::TimeNumber, T::AreaNumber, T::VolumeNumber,
    ];

    /// Every operand pair a binary kind accepts, with its result.
    fn accepted(kind: BinaryKind) -> Vec<(ResultType, ResultType, ResultType)> {
        use BinaryKind as K;

        let complex = [
            (T::Number, T::Number, T::Number),
            (T::ComplexNumber, T::ComplexNumber, T::ComplexNumber),
            (T::Number, T::ComplexNumber, T::ComplexNumber),
            (T::ComplexNumber, T::Number, T::ComplexNumber),
        ];
        let rational = [
            (T::RationalNumber, T::RationalNumber, T::RationalNumber),
            (T::RationalNumber, T::Number, T::RationalNumber),
            (T::Number, T::RationalNumber, T::RationalNumber),
        ];
        let scaled = QUANTITIES.iter().flat_map(|&q| [(T::Number, q, q), (q, T::Number, q)]);

        let mut table = Vec::new();
        match kind {
            K::Add | K::Sub => {
                table.extend(complex);
                table.extend(rational);
                table.extend(scaled);
                table.extend(QUANTITIES.iter().map(|&q| (q, q, q)));
                table.push((T::Vector, T::Vector, T::Vector));
                table.push((T::Matrix, T::Matrix, T::Matrix));
                if kind == K::Add {
                    table.push((T::String, T::String, T::String));
                }
            },
            K::Mul => {
                table.extend(complex);
                table.extend(rational);
                table.extend(scaled);
                table.extend([
                    (T::LengthNumber, T::LengthNumber, T::AreaNumber),
                    (T::LengthNumber, T::AreaNumber, T::VolumeNumber),
                    (T::AreaNumber, T::LengthNumber, T::VolumeNumber),
                    (T::Number, T::Vector, T::Vector),
                    (T::Vector, T::Number, T::Vector),
                    (T::Number, T::Matrix, T::Matrix),
                    (T::Matrix, T::Number, T::Matrix),
                    (T::Matrix, T::Matrix, T::Matrix),
                    (T::Matrix, T::Vector, T::Matrix),
                    (T::Vector, T::Matrix, T::Matrix),
                ]);
            },
            K::Div => {
                table.extend(complex);
                table.extend(rational);
                table.extend(QUANTITIES.iter().flat_map(|&q| [(q, q, T::Number), (q, T::Number, q)]));
                table.push((T::Vector, T::Number, T::Vector));
                table.push((T::Matrix, T::Number, T::Matrix));
            },
            K::Pow => {
                table.extend(complex);
                table.push((T::Matrix, T::Number, T::Matrix));
            },
            K::Root | K::Mod | K::Round => table.push((T::Number, T::Number, T::Number)),
            K::Log => {
                table.push((T::Number, T::Number, T::Number));
                table.push((T::Number, T::ComplexNumber, T::ComplexNumber));
            },
            K::Less | K::LessEqual | K::Greater | K::GreaterEqual => {
                table.push((T::Number, T::Number, T::Boolean));
                table.extend(QUANTITIES.iter().map(|&q| (q, q, T::Boolean)));
            },
            K::Equal | K::NotEqual => {
                table.push((T::Number, T::Number, T::Boolean));
                table.push((T::Boolean, T::Boolean, T::Boolean));
                table.push((T::ComplexNumber, T::ComplexNumber, T::Boolean));
                table.extend(QUANTITIES.iter().map(|&q| (q, q, T::Boolean)));
            },
            K::BitAnd | K::BitOr | K::Xor | K::Nand | K::Nor | K::Implication | K::Equivalence => {
                table.push((T::Number, T::Number, T::Number));
                table.push((T::Boolean, T::Boolean, T::Boolean));
            },
            K::And | K::Or => table.push((T::Boolean, T::Boolean, T::Boolean)),
            K::DotProduct => table.push((T::Vector, T::Vector, T::Number)),
            K::CrossProduct => table.push((T::Vector, T::Vector, T::Vector)),
        }
        table
    }

    #[test]
    fn test_binary_table() {
        let defined = ResultType::ALL.iter().copied().filter(|t| *t != T::Undefined).collect::<Vec<_>>();
        for &kind in BinaryKind::ALL {
            let table = accepted(kind);
            for &l in &defined {
                for &r in &defined {
                    let expected = table.iter().find(|(a, b, _)| *a == l && *b == r).map(|(_, _, t)| *t);
                    assert_eq!(binary_type(kind, l, r), expected, "{kind} with {l} and {r}");
                }
            }
        }
    }

    #[test]
    fn test_binary_nodes() {
        let analyzer = TypeAnalyzer::new();
        let quantity = |u: Unit| AstNode::Quantity(Quantity::new(1.0, u));
        let units = [
            Unit::Degree, Unit::Watt, Unit::Kelvin, Unit::Gram,
            Unit::Meter, Unit::Second, Unit::SquareMeter, Unit::Liter,
        ];
        for kind in [BinaryKind::Add, BinaryKind::Sub] {
            for (i, a) in units.iter().enumerate() {
                for (j, b) in units.iter().enumerate() {
                    let node = AstNode::binary(kind, quantity(*a), quantity(*b));
                    let result = analyzer.result_type(&node);
                    if i == j {
                        assert_eq!(result, Ok(QUANTITIES[i]), "{node}");
                    } else {
                        assert_eq!(result, Err(binary_mismatch(kind.symbol(), QUANTITIES[i], QUANTITIES[j])), "{node}");
                    }
                }
            }
        }

        let complex = AstNode::Complex(num_complex::Complex::new(1.0, 2.0));
        let vector = AstNode::vector(vec![AstNode::one()]);
        let matrix = AstNode::Matrix(crate::astnode::Matrix::new(vec![vector.clone()]).unwrap());
        for &kind in BinaryKind::ALL {
            for other in [&vector, &matrix, &AstNode::Bool(true)] {
                for node in [
                    AstNode::binary(kind, complex.clone(), other.clone()),
                    AstNode::binary(kind, other.clone(), complex.clone()),
                ] {
                    assert!(
                        matches!(analyzer.result_type(&node), Err(TypeMismatchError::BinaryParameterTypeMismatch { .. })),
                        "{node}",
                    );
                }
            }
            let node = AstNode::binary(kind, AstNode::Bool(true), AstNode::one());
            assert!(analyzer.result_type(&node).is_err(), "{node}");
            let node = AstNode::binary(kind, AstNode::variable("x"), complex.clone());
            assert_eq!(analyzer.result_type(&node), Ok(T::Undefined), "{node}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultType::ComplexNumber.to_string(), "ComplexNumber");
        assert_eq!(ResultType::from(Dimension::Volume), ResultType::VolumeNumber);
    }
}
