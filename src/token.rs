//! # token.rs
//!
//! Token vocabulary produced by the lexer and consumed by the parser.

use crate::units::Unit;
use num_complex::Complex;
use phf::Map;
use phf_macros::phf_map;
use std::fmt;

/// Error returned when a string is not an operator symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOperatorError;

#[doc(hidden)]
/// Internal macro to define the closed operator set.
///
/// Each operator declares the symbol the lexer matches and whether it is written
/// after its operand.
macro_rules! operator_kinds {
    ($( $name:ident => { symbol: $symbol:literal, postfix: $postfix:literal } ),+ $(,)?) => {
        /// Every operator the lexer can emit.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum OperatorKind {
            $( $name ),+
        }

        impl OperatorKind {
            pub fn symbol(&self) -> &'static str {
                match self {
                    $( Self::$name => $symbol, )+
                }
            }

            /// Returns `true` for operators written after their operand (`!`, `++`, `--`).
            pub fn is_postfix(&self) -> bool {
                match self {
                    $( Self::$name => $postfix, )+
                }
            }

            pub fn names() -> &'static [&'static str] {
                &[ $( $symbol ),+ ]
            }
        }

        impl std::str::FromStr for OperatorKind {
            type Err = ParseOperatorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $symbol => Ok(Self::$name), )+
                    // assignment accepts both spellings
                    "=" => Ok(Self::Assign),
                    _ => Err(ParseOperatorError),
                }
            }
        }
    };
}

operator_kinds! {
    Plus         => { symbol: "+",   postfix: false },
    Minus        => { symbol: "-",   postfix: false },
    Multiply     => { symbol: "*",   postfix: false },
    Divide       => { symbol: "/",   postfix: false },
    Power        => { symbol: "^",   postfix: false },
    Modulo       => { symbol: "%",   postfix: false },
    Rational     => { symbol: "//",  postfix: false },
    Negate       => { symbol: "neg", postfix: false },

    Less         => { symbol: "<",   postfix: false },
    LessEqual    => { symbol: "<=",  postfix: false },
    Greater      => { symbol: ">",   postfix: false },
    GreaterEqual => { symbol: ">=",  postfix: false },
    Equal        => { symbol: "==",  postfix: false },
    NotEqual     => { symbol: "!=",  postfix: false },

    BitAnd       => { symbol: "&",   postfix: false },
    BitOr        => { symbol: "|",   postfix: false },
    Xor          => { symbol: "xor", postfix: false },
    Nand         => { symbol: "nand", postfix: false },
    Nor          => { symbol: "nor", postfix: false },
    Implication  => { symbol: "->",  postfix: false },
    Equivalence  => { symbol: "<->", postfix: false },
    And          => { symbol: "&&",  postfix: false },
    Or           => { symbol: "||",  postfix: false },
    Not          => { symbol: "~",   postfix: false },

    Assign       => { symbol: ":=",  postfix: false },
    AddAssign    => { symbol: "+=",  postfix: false },
    SubAssign    => { symbol: "-=",  postfix: false },
    MulAssign    => { symbol: "*=",  postfix: false },
    DivAssign    => { symbol: "/=",  postfix: false },
    Increment    => { symbol: "++",  postfix: true },
    Decrement    => { symbol: "--",  postfix: true },
    Factorial    => { symbol: "!",   postfix: true },
}

impl OperatorKind {
    /// Returns `true` for `:=`/`=` and the compound assignments.
    pub fn is_assignment(&self) -> bool {
        matches!(self, Self::Assign | Self::AddAssign | Self::SubAssign | Self::MulAssign | Self::DivAssign)
    }
}

/// Case-insensitive word spellings of operators.
static WORD_OPERATORS: Map<&'static str, OperatorKind> = phf_map! {
    "and"  => OperatorKind::BitAnd,
    "or"   => OperatorKind::BitOr,
    "xor"  => OperatorKind::Xor,
    "not"  => OperatorKind::Not,
    "mod"  => OperatorKind::Modulo,
    "impl" => OperatorKind::Implication,
    "eq"   => OperatorKind::Equivalence,
    "nand" => OperatorKind::Nand,
    "nor"  => OperatorKind::Nor,
};

/// Looks up a word operator, ignoring ASCII case.
pub fn word_operator(word: &str) -> Option<OperatorKind> {
    WORD_OPERATORS.get(word.to_ascii_lowercase().as_str()).copied()
}

/// Brackets and the argument separator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
}

impl SymbolKind {
    pub fn symbol(&self) -> char {
        match self {
            Self::OpenParen => '(',
            Self::CloseParen => ')',
            Self::OpenBrace => '{',
            Self::CloseBrace => '}',
            Self::Comma => ',',
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::OpenParen | Self::OpenBrace)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Self::CloseParen | Self::CloseBrace)
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Real numeric literal.
    Number(f64),

    /// Complex literal (`2i`, `3-2i`, `2∠45°`).
    Complex(Complex<f64>),

    Boolean(bool),

    /// Variable or constant name.
    Identifier(String),

    /// Name directly followed by a bracket, with the number of top-level arguments.
    Function { name: String, arity: usize },

    /// Unit suffix following a numeric literal.
    Unit(Unit),

    Operator(OperatorKind),

    Symbol(SymbolKind),
}

impl Token {
    /// Returns `true` if the token can close an operand.
    pub fn ends_value(&self) -> bool {
        match self {
            Self::Number(_) | Self::Complex(_) | Self::Boolean(_) | Self::Identifier(_) | Self::Unit(_) => true,
            Self::Symbol(sym) => sym.is_close(),
            Self::Operator(op) => op.is_postfix(),
            Self::Function { .. } => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Complex(c) => write!(f, "{}{:+}i", c.re, c.im),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Function { name, .. } => write!(f, "{name}"),
            Self::Unit(unit) => write!(f, "{unit}"),
            Self::Operator(op) => write!(f, "{}", op.symbol()),
            Self::Symbol(sym) => write!(f, "{}", sym.symbol()),
        }
    }
}

#[cfg(test)]
mod operator_kind_tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_str() {
        assert_eq!(OperatorKind::from_str("+"), Ok(OperatorKind::Plus));
        assert_eq!(OperatorKind::from_str("//"), Ok(OperatorKind::Rational));
        assert_eq!(OperatorKind::from_str("<->"), Ok(OperatorKind::Equivalence));
        assert_eq!(OperatorKind::from_str("="), Ok(OperatorKind::Assign));
        assert_eq!(OperatorKind::from_str(":="), Ok(OperatorKind::Assign));
        assert!(OperatorKind::from_str("<-").is_err());
        assert!(OperatorKind::from_str("").is_err());
    }

    #[test]
    fn test_postfix() {
        assert!(OperatorKind::Factorial.is_postfix());
        assert!(OperatorKind::Increment.is_postfix());
        assert!(!OperatorKind::Minus.is_postfix());
        assert!(OperatorKind::DivAssign.is_assignment());
        assert!(!OperatorKind::Equal.is_assignment());
    }

    #[test]
    fn test_word_operator() {
        assert_eq!(word_operator("AND"), Some(OperatorKind::BitAnd));
        assert_eq!(word_operator("Mod"), Some(OperatorKind::Modulo));
        assert_eq!(word_operator("eq"), Some(OperatorKind::Equivalence));
        assert_eq!(word_operator("sin"), None);
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;

    #[test]
    fn test_ends_value() {
        assert!(Token::Number(1.0).ends_value());
        assert!(Token::Symbol(SymbolKind::CloseBrace).ends_value());
        assert!(Token::Operator(OperatorKind::Factorial).ends_value());
        assert!(!Token::Operator(OperatorKind::Plus).ends_value());
        assert!(!Token::Symbol(SymbolKind::Comma).ends_value());
        assert!(!Token::Function { name: "sin".into(), arity: 1 }.ends_value());
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Complex(Complex::new(3.0, -2.0)).to_string(), "3-2i");
        assert_eq!(Token::Operator(OperatorKind::Assign).to_string(), ":=");
        assert_eq!(Token::Symbol(SymbolKind::OpenBrace).to_string(), "{");
    }
}
