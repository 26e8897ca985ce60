//! # parser.rs
//!
//! Recursive-descent parser turning a token sequence into an [`AstNode`] tree.
//!
//! Precedence, from lowest to highest:
//!
//! | level | operators |
//! |---|---|
//! | assignment (right assoc) | `:=` `=` `+=` `-=` `*=` `/=` |
//! | conditional or | `\|\|` |
//! | conditional and | `&&` |
//! | equality / relational | `==` `!=` `<` `<=` `>` `>=` |
//! | bitwise or | `\|` `xor` `nor` `->` `<->` |
//! | bitwise and | `&` `nand` |
//! | additive | `+` `-` |
//! | multiplicative | `*` `/` `%` `//`, implicit multiplication |
//! | unary | `not` `-` |
//! | power (right assoc) | `^` |
//! | postfix | `!` `++` `--` |
//!
//! Built-in function names resolve through a static table; a name resolves to its
//! built-in kind only when the call arity is one the built-in accepts. Everything
//! else becomes a [`AstNode::UserFunction`] call, checked against the
//! [`UserFunctionTable`].

use crate::astnode::{AssignKind, AstNode, BinaryKind, Matrix, UnaryKind, VariadicKind, Vector};
use crate::error::ParseError;
use crate::token::{OperatorKind, SymbolKind, Token};
use crate::units::Quantity;
use crate::variable::UserFunctionTable;

use phf::Map;
use phf_macros::phf_map;

/// Variable assumed by `derivative(e)` without an explicit variable.
pub const DEFAULT_DERIVATIVE_VARIABLE: &str = "x";

/// Node family a built-in function name resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Builtin {
    Unary(UnaryKind),
    Binary(BinaryKind),
    Variadic(VariadicKind),
    /// `log(x)` is `lg`, `log(b, x)` is the base-`b` logarithm.
    Log,
    /// `round(x)` or `round(x, digits)`.
    Round,
    Vector,
    Matrix,
    Define,
    Undefine,
    If,
    For,
    While,
    Simplify,
    Derivative,
}

impl Builtin {
    fn accepts(&self, arity: usize) -> bool {
        match self {
            Self::Unary(_) | Self::Undefine | Self::Simplify => arity == 1,
            Self::Binary(_) | Self::Define | Self::While => arity == 2,
            Self::Variadic(kind) => arity >= kind.min_args(),
            Self::Log | Self::Round | Self::Derivative => arity == 1 || arity == 2,
            Self::If => arity == 2 || arity == 3,
            Self::For => arity == 4,
            Self::Vector | Self::Matrix => true,
        }
    }
}

/// Map of built-in functions and keywords by name.
static FUNCTIONS: Map<&'static str, Builtin> = phf_map! {
    "abs"       => Builtin::Unary(UnaryKind::Abs),
    "ceil"      => Builtin::Unary(UnaryKind::Ceil),
    "floor"     => Builtin::Unary(UnaryKind::Floor),
    "trunc"     => Builtin::Unary(UnaryKind::Trunc),
    "frac"      => Builtin::Unary(UnaryKind::Frac),
    "sign"      => Builtin::Unary(UnaryKind::Sign),
    "fact"      => Builtin::Unary(UnaryKind::Factorial),

    "exp"       => Builtin::Unary(UnaryKind::Exp),
    "ln"        => Builtin::Unary(UnaryKind::Ln),
    "lg"        => Builtin::Unary(UnaryKind::Lg),
    "log10"     => Builtin::Unary(UnaryKind::Lg),
    "lb"        => Builtin::Unary(UnaryKind::Lb),
    "log2"      => Builtin::Unary(UnaryKind::Lb),
    "sqrt"      => Builtin::Unary(UnaryKind::Sqrt),

    "sin"       => Builtin::Unary(UnaryKind::Sin),
    "cos"       => Builtin::Unary(UnaryKind::Cos),
    "tan"       => Builtin::Unary(UnaryKind::Tan),
    "cot"       => Builtin::Unary(UnaryKind::Cot),
    "sec"       => Builtin::Unary(UnaryKind::Sec),
    "csc"       => Builtin::Unary(UnaryKind::Csc),
    "arcsin"    => Builtin::Unary(UnaryKind::Arcsin),
    "arccos"    => Builtin::Unary(UnaryKind::Arccos),
    "arctan"    => Builtin::Unary(UnaryKind::Arctan),
    "arccot"    => Builtin::Unary(UnaryKind::Arccot),
    "arcsec"    => Builtin::Unary(UnaryKind::Arcsec),
    "arccsc"    => Builtin::Unary(UnaryKind::Arccsc),
    "asin"      => Builtin::Unary(UnaryKind::Arcsin),
    "acos"      => Builtin::Unary(UnaryKind::Arccos),
    "atan"      => Builtin::Unary(UnaryKind::Arctan),

    "sinh"      => Builtin::Unary(UnaryKind::Sinh),
    "cosh"      => Builtin::Unary(UnaryKind::Cosh),
    "tanh"      => Builtin::Unary(UnaryKind::Tanh),
    "coth"      => Builtin::Unary(UnaryKind::Coth),
    "sech"      => Builtin::Unary(UnaryKind::Sech),
    "csch"      => Builtin::Unary(UnaryKind::Csch),
    "arsinh"    => Builtin::Unary(UnaryKind::Arsinh),
    "arcosh"    => Builtin::Unary(UnaryKind::Arcosh),
    "artanh"    => Builtin::Unary(UnaryKind::Artanh),
    "arcoth"    => Builtin::Unary(UnaryKind::Arcoth),
    "arsech"    => Builtin::Unary(UnaryKind::Arsech),
    "arcsch"    => Builtin::Unary(UnaryKind::Arcsch),
    "asinh"     => Builtin::Unary(UnaryKind::Arsinh),
    "acosh"     => Builtin::Unary(UnaryKind::Arcosh),
    "atanh"     => Builtin::Unary(UnaryKind::Artanh),

    "re"        => Builtin::Unary(UnaryKind::Re),
    "im"        => Builtin::Unary(UnaryKind::Im),
    "phase"     => Builtin::Unary(UnaryKind::Phase),
    "arg"       => Builtin::Unary(UnaryKind::Phase),
    "conjugate" => Builtin::Unary(UnaryKind::Conjugate),
    "conj"      => Builtin::Unary(UnaryKind::Conjugate),
    "reciprocal" => Builtin::Unary(UnaryKind::Reciprocal),

    "todeg"     => Builtin::Unary(UnaryKind::ToDeg),
    "torad"     => Builtin::Unary(UnaryKind::ToRad),
    "tograd"    => Builtin::Unary(UnaryKind::ToGrad),
    "tonumber"  => Builtin::Unary(UnaryKind::ToNumber),
    "tobin"     => Builtin::Unary(UnaryKind::ToBin),
    "tooct"     => Builtin::Unary(UnaryKind::ToOct),
    "tohex"     => Builtin::Unary(UnaryKind::ToHex),

    "transpose" => Builtin::Unary(UnaryKind::Transpose),
    "det"       => Builtin::Unary(UnaryKind::Det),
    "inverse"   => Builtin::Unary(UnaryKind::Inverse),

    "root"      => Builtin::Binary(BinaryKind::Root),
    "dotproduct" => Builtin::Binary(BinaryKind::DotProduct),
    "crossproduct" => Builtin::Binary(BinaryKind::CrossProduct),
    "log"       => Builtin::Log,
    "round"     => Builtin::Round,

    "gcd"       => Builtin::Variadic(VariadicKind::Gcd),
    "lcm"       => Builtin::Variadic(VariadicKind::Lcm),
    "min"       => Builtin::Variadic(VariadicKind::Min),
    "max"       => Builtin::Variadic(VariadicKind::Max),
    "avg"       => Builtin::Variadic(VariadicKind::Avg),
    "count"     => Builtin::Variadic(VariadicKind::Count),
    "sum"       => Builtin::Variadic(VariadicKind::Sum),
    "product"   => Builtin::Variadic(VariadicKind::Product),
    "stdev"     => Builtin::Variadic(VariadicKind::Stdev),
    "stdevp"    => Builtin::Variadic(VariadicKind::Stdevp),
    "var"       => Builtin::Variadic(VariadicKind::Var),
    "varp"      => Builtin::Variadic(VariadicKind::Varp),

    "vector"    => Builtin::Vector,
    "matrix"    => Builtin::Matrix,
    "define"    => Builtin::Define,
    "def"       => Builtin::Define,
    "undef"     => Builtin::Undefine,
    "if"        => Builtin::If,
    "for"       => Builtin::For,
    "while"     => Builtin::While,
    "simplify"  => Builtin::Simplify,
    "derivative" => Builtin::Derivative,
    "deriv"     => Builtin::Derivative,
};

/// Parser state over a borrowed token slice.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    users: &'a UserFunctionTable,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_operator(&self) -> Option<OperatorKind> {
        match self.peek() {
            Some(Token::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<&'a Token, ParseError> {
        let token = self.tokens.get(self.pos).ok_or(ParseError::UnexpectedEnd { expected })?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken { found: token.to_string(), index: self.pos },
            None => ParseError::UnexpectedEnd { expected: "an operand" },
        }
    }

    fn expect_symbol(&mut self, symbol: SymbolKind, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(Token::Symbol(s)) if *s == symbol => {
                self.pos += 1;
                Ok(())
            },
            Some(token) => Err(ParseError::UnexpectedToken { found: token.to_string(), index: self.pos }),
            None => Err(ParseError::UnexpectedEnd { expected }),
        }
    }

    /// Parses a left-associative chain of the operators `ops` maps.
    fn parse_left_assoc<M, F>(&mut self, map: M, mut operand: F) -> Result<AstNode, ParseError>
    where
        M: Fn(OperatorKind) -> Option<BinaryKind>,
        F: FnMut(&mut Self) -> Result<AstNode, ParseError>,
    {
        let mut left = operand(self)?;
        while let Some(kind) = self.peek_operator().and_then(&map) {
            self.pos += 1;
            let right = operand(self)?;
            left = AstNode::binary(kind, left, right);
        }
        Ok(left)
    }

    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let target = self.parse_or()?;
        let Some(op) = self.peek_operator().filter(OperatorKind::is_assignment) else {
            return Ok(target);
        };
        self.pos += 1;
        let value = self.parse_assignment()?;

        let kind = match op {
            OperatorKind::AddAssign => AssignKind::Add,
            OperatorKind::SubAssign => AssignKind::Sub,
            OperatorKind::MulAssign => AssignKind::Mul,
            OperatorKind::DivAssign => AssignKind::Div,
            _ => return make_define(target, value),
        };
        if !matches!(target, AstNode::Variable(_)) {
            return Err(ParseError::InvalidIncrementTarget {
                operator: kind.symbol(),
                found: target.to_string(),
            });
        }
        Ok(AstNode::Assign { kind, target: Box::new(target), value: Box::new(value) })
    }

    fn parse_or(&mut self) -> Result<AstNode, ParseError> {
        self.parse_left_assoc(
            |op| (op == OperatorKind::Or).then_some(BinaryKind::Or),
            Self::parse_and,
        )
    }

    fn parse_and(&mut self) -> Result<AstNode, ParseError> {
        self.parse_left_assoc(
            |op| (op == OperatorKind::And).then_some(BinaryKind::And),
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        self.parse_left_assoc(
            |op| match op {
                OperatorKind::Less => Some(BinaryKind::Less),
                OperatorKind::LessEqual => Some(BinaryKind::LessEqual),
                OperatorKind::Greater => Some(BinaryKind::Greater),
                OperatorKind::GreaterEqual => Some(BinaryKind::GreaterEqual),
                OperatorKind::Equal => Some(BinaryKind::Equal),
                OperatorKind::NotEqual => Some(BinaryKind::NotEqual),
                _ => None,
            },
            Self::parse_bit_or,
        )
    }

    fn parse_bit_or(&mut self) -> Result<AstNode, ParseError> {
        self.parse_left_assoc(
            |op| match op {
                OperatorKind::BitOr => Some(BinaryKind::BitOr),
                OperatorKind::Xor => Some(BinaryKind::Xor),
                OperatorKind::Nor => Some(BinaryKind::Nor),
                OperatorKind::Implication => Some(BinaryKind::Implication),
                OperatorKind::Equivalence => Some(BinaryKind::Equivalence),
                _ => None,
            },
            Self::parse_bit_and,
        )
    }

    fn parse_bit_and(&mut self) -> Result<AstNode, ParseError> {
        self.parse_left_assoc(
            |op| match op {
                OperatorKind::BitAnd => Some(BinaryKind::BitAnd),
                OperatorKind::Nand => Some(BinaryKind::Nand),
                _ => None,
            },
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        self.parse_left_assoc(
            |op| match op {
                OperatorKind::Plus => Some(BinaryKind::Add),
                OperatorKind::Minus => Some(BinaryKind::Sub),
                _ => None,
            },
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek_operator() {
                Some(op @ (OperatorKind::Multiply | OperatorKind::Divide | OperatorKind::Modulo | OperatorKind::Rational)) => {
                    self.pos += 1;
                    let right = self.parse_unary()?;
                    left = match op {
                        OperatorKind::Multiply => left.mul(right),
                        OperatorKind::Divide => left.div(right),
                        OperatorKind::Modulo => AstNode::binary(BinaryKind::Mod, left, right),
                        _ => AstNode::rational(left, right),
                    };
                },
                _ if self.implicit_multiplication() => {
                    let right = self.parse_unary()?;
                    log::trace!("implicit multiplication before token {}", self.pos);
                    left = left.mul(right);
                },
                _ => return Ok(left),
            }
        }
    }

    /// Returns `true` if the previous token closes a numeric or grouped operand and the
    /// next token starts a new one.
    fn implicit_multiplication(&self) -> bool {
        let Some(prev) = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) else {
            return false;
        };
        let after_bracket = matches!(prev, Token::Symbol(SymbolKind::CloseParen | SymbolKind::CloseBrace));
        let after_literal = matches!(prev, Token::Number(_) | Token::Complex(_) | Token::Unit(_));
        match self.peek() {
            Some(Token::Identifier(_) | Token::Function { .. } | Token::Symbol(SymbolKind::OpenParen)) => {
                after_bracket || after_literal
            },
            Some(Token::Number(_) | Token::Complex(_)) => after_bracket,
            _ => false,
        }
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        match self.peek_operator() {
            Some(OperatorKind::Negate) => {
                self.pos += 1;
                let start = self.pos;
                let operand = self.parse_unary()?;
                let consumed = self.pos - start;
                // a bare literal after `-` is a negative literal
                Ok(match operand {
                    AstNode::Number(v) if consumed == 1 => AstNode::Number(-v),
                    AstNode::Complex(c) if consumed == 1 => AstNode::Complex(-c),
                    AstNode::Quantity(q) if consumed == 2 => AstNode::Quantity(Quantity::new(-q.value(), q.unit())),
                    operand => operand.negative(),
                })
            },
            Some(OperatorKind::Not) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(AstNode::unary(UnaryKind::Not, operand))
            },
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<AstNode, ParseError> {
        let base = self.parse_postfix()?;
        if self.peek_operator() != Some(OperatorKind::Power) {
            return Ok(base);
        }
        self.pos += 1;
        let exponent = match self.peek_operator() {
            Some(OperatorKind::Negate | OperatorKind::Not) => self.parse_unary()?,
            _ => self.parse_power()?,
        };
        Ok(base.pow(exponent))
    }

    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut node = self.parse_primary()?;
        loop {
            node = match self.peek_operator() {
                Some(OperatorKind::Factorial) => AstNode::unary(UnaryKind::Factorial, node),
                Some(op @ (OperatorKind::Increment | OperatorKind::Decrement)) => {
                    if !matches!(node, AstNode::Variable(_)) {
                        return Err(ParseError::InvalidIncrementTarget {
                            operator: op.symbol(),
                            found: node.to_string(),
                        });
                    }
                    if op == OperatorKind::Increment {
                        AstNode::Increment(Box::new(node))
                    } else {
                        AstNode::Decrement(Box::new(node))
                    }
                },
                _ => return Ok(node),
            };
            self.pos += 1;
        }
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let index = self.pos;
        let token = self.next("an operand")?;
        match token {
            Token::Number(v) => {
                if let Some(Token::Unit(unit)) = self.peek() {
                    self.pos += 1;
                    return Ok(AstNode::Quantity(Quantity::new(*v, *unit)));
                }
                Ok(AstNode::Number(*v))
            },
            Token::Complex(c) => Ok(AstNode::Complex(*c)),
            Token::Boolean(b) => Ok(AstNode::Bool(*b)),
            Token::Identifier(name) => Ok(AstNode::Variable(name.clone())),
            Token::Function { name, arity } => self.parse_call(name, *arity),
            Token::Symbol(SymbolKind::OpenParen) => {
                let node = self.parse_assignment()?;
                self.expect_symbol(SymbolKind::CloseParen, "')'")?;
                Ok(node)
            },
            Token::Symbol(SymbolKind::OpenBrace) => {
                let items = self.parse_list(SymbolKind::CloseBrace)?;
                let is_matrix = !items.is_empty() && items.iter().all(|item| matches!(item, AstNode::Vector(_)));
                if is_matrix {
                    Ok(AstNode::Matrix(Matrix::new(items)?))
                } else {
                    Ok(AstNode::Vector(Vector::new(items)))
                }
            },
            token => Err(ParseError::UnexpectedToken { found: token.to_string(), index }),
        }
    }

    /// Parses comma-separated expressions up to and including the `close` symbol.
    fn parse_list(&mut self, close: SymbolKind) -> Result<Vec<AstNode>, ParseError> {
        let mut items = Vec::new();
        if let Some(Token::Symbol(s)) = self.peek()
            && *s == close
        {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.parse_assignment()?);
            match self.next("',' or a closing bracket")? {
                Token::Symbol(SymbolKind::Comma) => continue,
                Token::Symbol(s) if *s == close => return Ok(items),
                token => {
                    return Err(ParseError::UnexpectedToken { found: token.to_string(), index: self.pos - 1 });
                },
            }
        }
    }

    fn parse_call(&mut self, name: &str, arity: usize) -> Result<AstNode, ParseError> {
        let close = match self.next("an argument list")? {
            Token::Symbol(SymbolKind::OpenParen) => SymbolKind::CloseParen,
            Token::Symbol(SymbolKind::OpenBrace) => SymbolKind::CloseBrace,
            token => {
                return Err(ParseError::UnexpectedToken { found: token.to_string(), index: self.pos - 1 });
            },
        };
        let args = self.parse_list(close)?;
        if args.len() != arity {
            return Err(ParseError::ArityMismatch { name: name.to_string(), found: args.len() });
        }

        match FUNCTIONS.get(name) {
            Some(builtin) if builtin.accepts(args.len()) => build_builtin(*builtin, args),
            _ if self.users.get(name, args.len()).is_some() => {
                Ok(AstNode::UserFunction { name: name.to_string(), args })
            },
            Some(_) => Err(ParseError::ArityMismatch { name: name.to_string(), found: args.len() }),
            None if self.users.contains_name(name) => {
                Err(ParseError::ArityMismatch { name: name.to_string(), found: args.len() })
            },
            None => Ok(AstNode::UserFunction { name: name.to_string(), args }),
        }
    }
}

/// Builds `target := value`, checking that the target is a variable or a function head.
fn make_define(target: AstNode, value: AstNode) -> Result<AstNode, ParseError> {
    let valid = match &target {
        AstNode::Variable(_) => true,
        AstNode::UserFunction { args, .. } => args.iter().all(|a| matches!(a, AstNode::Variable(_))),
        _ => false,
    };
    if !valid {
        return Err(ParseError::InvalidAssignmentTarget { found: target.to_string() });
    }
    Ok(AstNode::Define { target: Box::new(target), value: Box::new(value) })
}

/// Splits an argument list whose length the caller already checked.
fn take<const N: usize>(name: &str, args: Vec<AstNode>) -> Result<[AstNode; N], ParseError> {
    args.try_into().map_err(|args: Vec<AstNode>| ParseError::ArityMismatch {
        name: name.to_string(),
        found: args.len(),
    })
}

fn build_builtin(builtin: Builtin, args: Vec<AstNode>) -> Result<AstNode, ParseError> {
    let node = match builtin {
        Builtin::Unary(kind) => {
            let [x] = take(kind.name(), args)?;
            AstNode::unary(kind, x)
        },
        Builtin::Binary(kind) => {
            let [l, r] = take(kind.symbol(), args)?;
            AstNode::binary(kind, l, r)
        },
        Builtin::Variadic(kind) => AstNode::Variadic { kind, args },
        Builtin::Log if args.len() == 1 => {
            let [x] = take("log", args)?;
            AstNode::unary(UnaryKind::Lg, x)
        },
        Builtin::Log => {
            let [base, x] = take("log", args)?;
            AstNode::binary(BinaryKind::Log, base, x)
        },
        Builtin::Round if args.len() == 1 => {
            let [x] = take("round", args)?;
            AstNode::unary(UnaryKind::Round, x)
        },
        Builtin::Round => {
            let [x, digits] = take("round", args)?;
            AstNode::binary(BinaryKind::Round, x, digits)
        },
        Builtin::Vector => AstNode::Vector(Vector::new(args)),
        Builtin::Matrix => AstNode::Matrix(Matrix::new(args)?),
        Builtin::Define => {
            let [target, value] = take("define", args)?;
            make_define(target, value)?
        },
        Builtin::Undefine => {
            let [target] = take("undef", args)?;
            if !matches!(target, AstNode::Variable(_) | AstNode::UserFunction { .. }) {
                return Err(ParseError::ExpectedVariable { name: "undef", position: 1, found: target.to_string() });
            }
            AstNode::Undefine(Box::new(target))
        },
        Builtin::If if args.len() == 2 => {
            let [condition, then] = take("if", args)?;
            AstNode::If { condition: Box::new(condition), then: Box::new(then), otherwise: None }
        },
        Builtin::If => {
            let [condition, then, otherwise] = take("if", args)?;
            AstNode::If {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Some(Box::new(otherwise)),
            }
        },
        Builtin::For => {
            let [init, condition, iteration, body] = take("for", args)?;
            AstNode::For {
                init: Box::new(init),
                condition: Box::new(condition),
                iteration: Box::new(iteration),
                body: Box::new(body),
            }
        },
        Builtin::While => {
            let [condition, body] = take("while", args)?;
            AstNode::While { condition: Box::new(condition), body: Box::new(body) }
        },
        Builtin::Simplify => {
            let [expr] = take("simplify", args)?;
            AstNode::Simplify(Box::new(expr))
        },
        Builtin::Derivative if args.len() == 1 => {
            let [expr] = take("derivative", args)?;
            AstNode::Derivative { expr: Box::new(expr), variable: DEFAULT_DERIVATIVE_VARIABLE.to_string() }
        },
        Builtin::Derivative => {
            let [expr, variable] = take("derivative", args)?;
            let AstNode::Variable(variable) = variable else {
                return Err(ParseError::ExpectedVariable {
                    name: "derivative",
                    position: 2,
                    found: variable.to_string(),
                });
            };
            AstNode::Derivative { expr: Box::new(expr), variable }
        },
    };
    Ok(node)
}

/// Parses a token sequence into an expression tree.
///
/// # Arguments
///
/// * `tokens` - Tokens produced by [`crate::lexer::tokenize`].
/// * `users` - User-defined functions; calls are checked against their arity.
///
/// # Returns
///
/// * `Ok(AstNode)` - The root of the parsed tree.
/// * `Err(ParseError)` - On empty input, an unexpected or trailing token, an arity
///   mismatch, an invalid assignment target or a malformed matrix literal.
pub fn parse(tokens: &[Token], users: &UserFunctionTable) -> Result<AstNode, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let mut parser = Parser { tokens, pos: 0, users };
    let node = parser.parse_assignment()?;
    if parser.pos < tokens.len() {
        return Err(parser.unexpected());
    }
    log::debug!("parse: {} token(s) -> {}", tokens.len(), node);
    Ok(node)
}
