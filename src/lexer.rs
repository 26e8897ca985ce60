//! # lexer.rs
//!
//! Lexical analyzer for formulas.
//!
//! [`tokenize`] splits an input string into [`Token`]s. Besides plain scanning it
//! settles everything that needs character-level context:
//!
//! - numeric literals in decimal, scientific, hexadecimal, octal and binary form,
//! - imaginary literals (`2i`, `i`), rectangular complex literals (`3-2i`) at the
//!   start of an expression, and polar literals (`2∠45°`, `2+45°`),
//! - unit suffixes after a magnitude (`90 deg`, `3 m^2`, `20 °C`),
//! - the call-site arity of every function identifier,
//! - unary minus, which is emitted as [`OperatorKind::Negate`].

use crate::error::LexError;
use crate::token::{word_operator, OperatorKind, SymbolKind, Token};
use crate::units::Unit;

use num_complex::Complex;
use smallvec::SmallVec;
use std::ops::Range;
use std::str::FromStr;

/// Constant char representing an imaginary unit
pub const IMAGINARY_UNIT: char = 'i';

const DEGREE_SIGN: char = '°';
const ANGLE_SIGN: char = '∠';

/// Characters that may form a symbolic operator.
const OPERATOR_CHARS: &str = "+-*/^%<>=!&|~:";

type CharIter<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

/// An open bracket waiting for its partner.
#[derive(Debug, Clone, Copy)]
struct Frame {
    symbol: SymbolKind,
    position: usize,
    /// Index of the function token that owns this bracket.
    function: Option<usize>,
    /// Top-level commas seen so far.
    commas: usize,
    /// Token count right after the open bracket was pushed.
    start: usize,
}

/// Consumes characters while `pred` holds.
///
/// # Returns
///
/// The byte index just past the last consumed character, or `end` if nothing was consumed.
fn take_while<F>(chars: &mut CharIter, end: usize, pred: F) -> usize
where
    F: Fn(char) -> bool,
{
    let mut end = end;
    while let Some(&(idx, ch)) = chars.peek() {
        if !pred(ch) {
            break;
        }
        chars.next();
        end = idx + ch.len_utf8();
    }
    end
}

/// Returns a copy of the iterator advanced past any whitespace.
fn skip_whitespace<'a>(chars: &CharIter<'a>) -> CharIter<'a> {
    let mut look = chars.clone();
    while matches!(look.peek(), Some(&(_, ch)) if ch.is_whitespace()) {
        look.next();
    }
    look
}

fn peek_char(chars: &CharIter) -> Option<char> {
    chars.clone().peek().map(|&(_, ch)| ch)
}

/// Byte index of the next character, or the input length at the end.
fn offset(input: &str, chars: &CharIter) -> usize {
    chars.clone().peek().map_or(input.len(), |&(idx, _)| idx)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Spellings a non-finite number is displayed with.
fn non_finite(word: &str) -> Option<f64> {
    match word {
        "NaN" => Some(f64::NAN),
        "inf" => Some(f64::INFINITY),
        _ => None,
    }
}

fn malformed(input: &str, span: Range<usize>) -> LexError {
    LexError::MalformedNumber {
        text: input[span.clone()].to_string(),
        span,
    }
}

/// Parses an identifier starting at `start_idx`.
///
/// An identifier is a letter or underscore followed by alphanumeric characters or underscores.
///
/// # Returns
///
/// The ending index of the identifier.
fn parse_ident(start_idx: usize, chars: &mut CharIter) -> usize {
    take_while(chars, start_idx, is_ident_char)
}

/// Parses a numeric literal starting at `start_idx`.
///
/// Supports integers, decimals, scientific notation, `0x`/`0b` prefixes and octal
/// literals with a leading zero. An `e` that is not followed by an exponent ends the
/// literal so that `2e` reads as `2` times Euler's number.
///
/// # Returns
///
/// The literal value and its ending index.
fn parse_number(input: &str, start_idx: usize, chars: &mut CharIter) -> Result<(f64, usize), LexError> {
    let mut look = chars.clone();
    if let Some((_, '0')) = look.next()
        && let Some(&(_, prefix)) = look.peek()
    {
        let radix = match prefix {
            'x' | 'X' => Some(16),
            'b' | 'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            look.next();
            *chars = look;
            let digits_start = start_idx + 2;
            let end = take_while(chars, digits_start, |c| c.is_ascii_alphanumeric());
            return u64::from_str_radix(&input[digits_start..end], radix)
                .map(|v| (v as f64, end))
                .map_err(|_| malformed(input, start_idx..end));
        }
    }

    let mut end = take_while(chars, start_idx, |c| c.is_ascii_digit());
    let mut is_decimal = false;

    if let Some(&(_, '.')) = chars.peek() {
        chars.next();
        is_decimal = true;
        let frac_start = end + 1;
        end = take_while(chars, frac_start, |c| c.is_ascii_digit());
        if end == frac_start {
            return Err(malformed(input, start_idx..end));
        }
        if let Some(&(_, '.')) = chars.peek() {
            end = take_while(chars, end, |c| c.is_ascii_digit() || c == '.');
            return Err(malformed(input, start_idx..end));
        }
    }

    if let Some(&(_, 'e' | 'E')) = chars.peek() {
        let mut look = chars.clone();
        look.next();
        if matches!(look.peek(), Some(&(_, '+' | '-'))) {
            look.next();
        }
        // without an exponent digit the literal stops before `e`
        if matches!(look.peek(), Some(&(_, d)) if d.is_ascii_digit()) {
            let exp_start = offset(input, &look);
            *chars = look;
            end = take_while(chars, exp_start, |c| c.is_ascii_digit());
            is_decimal = true;
        }
    }

    let text = &input[start_idx..end];
    if !is_decimal && text.len() > 1 && text.starts_with('0') {
        return u64::from_str_radix(text, 8)
            .map(|v| (v as f64, end))
            .map_err(|_| malformed(input, start_idx..end));
    }

    text.parse::<f64>()
        .map(|v| (v, end))
        .map_err(|_| malformed(input, start_idx..end))
}

/// Scanner state for a single call to [`tokenize`].
struct Lexer<'a> {
    input: &'a str,
    chars: CharIter<'a>,
    tokens: Vec<Token>,
    /// Byte offset of every token in `tokens`.
    positions: Vec<usize>,
    brackets: SmallVec<[Frame; 8]>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            tokens: Vec::new(),
            positions: Vec::new(),
            brackets: SmallVec::new(),
        }
    }

    fn push(&mut self, token: Token, position: usize) {
        self.tokens.push(token);
        self.positions.push(position);
    }

    fn truncate(&mut self, len: usize) {
        self.tokens.truncate(len);
        self.positions.truncate(len);
    }

    /// Returns `true` if the next token would start an operand.
    fn at_operand_start(&self) -> bool {
        self.tokens.last().is_none_or(|token| !token.ends_value())
    }

    /// Returns `true` if the token at `idx` begins an expression.
    fn is_expression_start(&self, idx: usize) -> bool {
        match idx.checked_sub(1).map(|i| &self.tokens[i]) {
            None => true,
            Some(Token::Symbol(sym)) => !sym.is_close(),
            Some(Token::Operator(op)) => op.is_assignment(),
            Some(_) => false,
        }
    }

    /// Finds a leading `re ±` pair that a following literal can merge with.
    ///
    /// # Returns
    ///
    /// The index where the merged literal starts, the signed real part and
    /// whether the operator was `-`.
    fn mergeable_prefix(&self) -> Option<(usize, f64, bool)> {
        let n = self.tokens.len();
        if n < 2 {
            return None;
        }
        let negative = match self.tokens[n - 1] {
            Token::Operator(OperatorKind::Plus) => false,
            Token::Operator(OperatorKind::Minus) => true,
            _ => return None,
        };
        let Token::Number(re) = self.tokens[n - 2] else {
            return None;
        };
        if n >= 3
            && self.tokens[n - 3] == Token::Operator(OperatorKind::Negate)
            && self.is_expression_start(n - 3)
        {
            return Some((n - 3, -re, negative));
        }
        self.is_expression_start(n - 2).then_some((n - 2, re, negative))
    }

    /// Returns `true` if the next character ends an additive operand.
    fn followed_by_low_precedence(&self) -> bool {
        match peek_char(&skip_whitespace(&self.chars)) {
            None => true,
            Some(ch) => ")},+-=<>&|".contains(ch),
        }
    }

    /// Pushes an imaginary literal, merging it with a leading `re ±` pair when possible.
    fn push_imaginary(&mut self, im: f64, position: usize) {
        if self.followed_by_low_precedence()
            && let Some((start, re, negative)) = self.mergeable_prefix()
        {
            let im = if negative { -im } else { im };
            log::trace!("merged rectangular complex literal {re}{im:+}i");
            let position = self.positions[start];
            self.truncate(start);
            self.push(Token::Complex(Complex::new(re, im)), position);
            return;
        }
        self.push(Token::Complex(Complex::new(0.0, im)), position);
    }

    /// Reads a unit name following a magnitude, consuming it on success.
    fn scan_unit(&mut self) -> Option<Unit> {
        let mut look = skip_whitespace(&self.chars);
        let &(start, first) = look.peek()?;

        if first == DEGREE_SIGN {
            look.next();
            let &(idx, scale) = look.peek()?;
            if !matches!(scale, 'C' | 'F') {
                return None;
            }
            look.next();
            if peek_char(&look).is_some_and(is_ident_char) {
                return None;
            }
            let unit = Unit::from_str(&self.input[start..idx + 1]).ok()?;
            self.chars = look;
            return Some(unit);
        }

        if !first.is_alphabetic() {
            return None;
        }
        let end = parse_ident(start, &mut look);
        let word = &self.input[start..end];
        if word_operator(word).is_some() {
            return None;
        }

        // `m^2`, `cm^3`, ...
        let mut power = look.clone();
        if let Some((_, '^')) = power.next()
            && let Some((idx, '2' | '3')) = power.next()
            && !peek_char(&power).is_some_and(|c| c.is_ascii_digit() || c == '.')
            && let Ok(unit) = Unit::from_str(&self.input[start..idx + 1])
        {
            self.chars = power;
            return Some(unit);
        }

        if matches!(peek_char(&look), Some('(' | '{')) {
            return None;
        }
        let unit = Unit::from_str(word).ok()?;
        self.chars = look;
        Some(unit)
    }

    /// Handles what may follow a real literal: a unit, a polar angle or a degree marker.
    fn after_number(&mut self) -> Result<(), LexError> {
        if let Some(unit) = self.scan_unit() {
            let position = offset(self.input, &self.chars);
            self.push(Token::Unit(unit), position);
            return Ok(());
        }

        let mut look = skip_whitespace(&self.chars);
        match look.peek().copied() {
            Some((idx, ANGLE_SIGN)) => {
                look.next();
                self.chars = skip_whitespace(&look);
                let negative = match peek_char(&self.chars) {
                    Some('-') => { self.chars.next(); true },
                    Some('+') => { self.chars.next(); false },
                    _ => false,
                };
                let angle_start = offset(self.input, &self.chars);
                if !matches!(peek_char(&self.chars), Some(c) if c.is_ascii_digit() || c == '.') {
                    return Err(malformed(self.input, idx..angle_start));
                }
                let (angle, _) = parse_number(self.input, angle_start, &mut self.chars)?;
                let angle = if negative { -angle } else { angle };
                self.skip_degree_sign();

                if let Some(Token::Number(magnitude)) = self.tokens.last().cloned() {
                    let position = self.positions[self.positions.len() - 1];
                    self.truncate(self.tokens.len() - 1);
                    self.push(Token::Complex(Complex::from_polar(magnitude, angle.to_radians())), position);
                }
                Ok(())
            },
            Some((idx, DEGREE_SIGN)) => {
                let Some(Token::Number(angle)) = self.tokens.last().cloned() else {
                    return Err(LexError::MissingAngleMagnitude { position: idx });
                };
                self.chars = look;
                self.chars.next();

                // `m+a°` / `m-a°`
                let n = self.tokens.len();
                self.truncate(n - 1);
                if let Some((start, magnitude, negative)) = self.mergeable_prefix() {
                    let angle = if negative { -angle } else { angle };
                    let position = self.positions[start];
                    self.truncate(start);
                    self.push(Token::Complex(Complex::from_polar(magnitude, angle.to_radians())), position);
                    return Ok(());
                }
                Err(LexError::AmbiguousPhase { position: idx })
            },
            _ => Ok(()),
        }
    }

    /// Consumes an optional `°` that is not the start of `°C`/`°F`.
    fn skip_degree_sign(&mut self) {
        let mut look = skip_whitespace(&self.chars);
        if let Some((_, DEGREE_SIGN)) = look.next()
            && !matches!(peek_char(&look), Some('C' | 'F'))
        {
            self.chars = look;
        }
    }

    fn lex_number(&mut self, start_idx: usize) -> Result<(), LexError> {
        let (value, _) = parse_number(self.input, start_idx, &mut self.chars)?;

        let mut look = self.chars.clone();
        if let Some((_, IMAGINARY_UNIT)) = look.next()
            && !peek_char(&look).is_some_and(is_ident_char)
        {
            self.chars = look;
            self.push_imaginary(value, start_idx);
            return Ok(());
        }

        self.push(Token::Number(value), start_idx);
        self.after_number()
    }

    fn lex_word(&mut self, start_idx: usize) -> Result<(), LexError> {
        let end = parse_ident(start_idx, &mut self.chars);
        let word = &self.input[start_idx..end];

        if let Some(op) = word_operator(word) {
            self.push_operator(op, start_idx);
            return Ok(());
        }
        if word.eq_ignore_ascii_case("true") {
            self.push(Token::Boolean(true), start_idx);
            return Ok(());
        }
        if word.eq_ignore_ascii_case("false") {
            self.push(Token::Boolean(false), start_idx);
            return Ok(());
        }
        if let Some(value) = non_finite(word) {
            self.push(Token::Number(value), start_idx);
            return Ok(());
        }
        if matches!(peek_char(&self.chars), Some('(' | '{')) {
            self.push(Token::Function { name: word.to_string(), arity: 0 }, start_idx);
            return Ok(());
        }
        if word.len() == 1 && word.starts_with(IMAGINARY_UNIT) {
            self.push_imaginary(1.0, start_idx);
            return Ok(());
        }
        self.push(Token::Identifier(word.to_string()), start_idx);
        Ok(())
    }

    /// Reads the longest operator symbol at the current position.
    fn lex_operator(&mut self, start_idx: usize, first: char) -> Result<(), LexError> {
        let mut look = self.chars.clone();
        let mut candidates: SmallVec<[(usize, CharIter<'a>); 3]> = SmallVec::new();
        while candidates.len() < 3 {
            match look.peek() {
                Some(&(idx, ch)) if OPERATOR_CHARS.contains(ch) => {
                    look.next();
                    candidates.push((idx + ch.len_utf8(), look.clone()));
                },
                _ => break,
            }
        }

        for (end, rest) in candidates.into_iter().rev() {
            if let Ok(op) = OperatorKind::from_str(&self.input[start_idx..end]) {
                self.chars = rest;
                self.push_operator(op, start_idx);
                return Ok(());
            }
        }
        Err(LexError::UnknownSymbol { symbol: first, position: start_idx })
    }

    /// Pushes an operator, resolving unary forms of `+ - ++ --`.
    fn push_operator(&mut self, op: OperatorKind, position: usize) {
        let unary = self.at_operand_start();
        match op {
            OperatorKind::Plus | OperatorKind::Increment if unary => {},
            OperatorKind::Minus if unary => self.push(Token::Operator(OperatorKind::Negate), position),
            OperatorKind::Decrement if unary => {
                self.push(Token::Operator(OperatorKind::Negate), position);
                self.push(Token::Operator(OperatorKind::Negate), position + 1);
            },
            OperatorKind::Increment | OperatorKind::Decrement if self.operand_follows() => {
                // `x--y` is `x - (-y)`, `x++y` is `x + y`
                if op == OperatorKind::Increment {
                    self.push(Token::Operator(OperatorKind::Plus), position);
                } else {
                    self.push(Token::Operator(OperatorKind::Minus), position);
                    self.push(Token::Operator(OperatorKind::Negate), position + 1);
                }
            },
            _ => self.push(Token::Operator(op), position),
        }
    }

    fn operand_follows(&self) -> bool {
        peek_char(&skip_whitespace(&self.chars))
            .is_some_and(|c| is_ident_char(c) || matches!(c, '.' | '(' | '{'))
    }

    fn open_bracket(&mut self, symbol: SymbolKind, position: usize) {
        let function = match self.tokens.last() {
            Some(Token::Function { .. }) => Some(self.tokens.len() - 1),
            _ => None,
        };
        self.push(Token::Symbol(symbol), position);
        self.brackets.push(Frame {
            symbol,
            position,
            function,
            commas: 0,
            start: self.tokens.len(),
        });
    }

    fn close_bracket(&mut self, symbol: SymbolKind, position: usize) -> Result<(), LexError> {
        let expected = match symbol {
            SymbolKind::CloseParen => SymbolKind::OpenParen,
            _ => SymbolKind::OpenBrace,
        };
        let frame = match self.brackets.pop() {
            Some(frame) if frame.symbol == expected => frame,
            _ => return Err(LexError::UnbalancedBracket { bracket: symbol.symbol(), position }),
        };

        let count = if self.tokens.len() > frame.start { frame.commas + 1 } else { 0 };
        if let Some(idx) = frame.function
            && let Token::Function { arity, .. } = &mut self.tokens[idx]
        {
            *arity = count;
        }
        self.push(Token::Symbol(symbol), position);
        Ok(())
    }

    fn run(&mut self) -> Result<(), LexError> {
        while let Some(&(start_idx, ch)) = self.chars.peek() {
            match ch {
                c if c.is_whitespace() => { self.chars.next(); },
                c if c.is_ascii_digit() || c == '.' => self.lex_number(start_idx)?,
                c if c.is_alphabetic() || c == '_' => self.lex_word(start_idx)?,
                '(' => { self.chars.next(); self.open_bracket(SymbolKind::OpenParen, start_idx) },
                '{' => { self.chars.next(); self.open_bracket(SymbolKind::OpenBrace, start_idx) },
                ')' => { self.chars.next(); self.close_bracket(SymbolKind::CloseParen, start_idx)? },
                '}' => { self.chars.next(); self.close_bracket(SymbolKind::CloseBrace, start_idx)? },
                ',' => {
                    self.chars.next();
                    if let Some(frame) = self.brackets.last_mut() {
                        frame.commas += 1;
                    }
                    self.push(Token::Symbol(SymbolKind::Comma), start_idx);
                },
                DEGREE_SIGN => {
                    if let Some(unit) = self.scan_unit() {
                        self.push(Token::Unit(unit), start_idx);
                    } else {
                        return Err(LexError::MissingAngleMagnitude { position: start_idx });
                    }
                },
                ANGLE_SIGN => return Err(LexError::MissingAngleMagnitude { position: start_idx }),
                c if OPERATOR_CHARS.contains(c) => self.lex_operator(start_idx, c)?,
                c => return Err(LexError::UnknownSymbol { symbol: c, position: start_idx }),
            }
        }

        if let Some(frame) = self.brackets.last() {
            return Err(LexError::UnbalancedBracket {
                bracket: frame.symbol.symbol(),
                position: frame.position,
            });
        }
        self.check_not_operands()
    }

    /// Every `not` must be followed by something that can start an operand.
    fn check_not_operands(&self) -> Result<(), LexError> {
        for (idx, token) in self.tokens.iter().enumerate() {
            if *token != Token::Operator(OperatorKind::Not) {
                continue;
            }
            let has_operand = match self.tokens.get(idx + 1) {
                None => false,
                Some(Token::Symbol(sym)) => sym.is_open(),
                Some(Token::Operator(op)) => matches!(op, OperatorKind::Negate | OperatorKind::Not),
                Some(_) => true,
            };
            if !has_operand {
                return Err(LexError::MissingNotOperand { position: self.positions[idx] });
            }
        }
        Ok(())
    }
}

/// Splits the input string into a sequence of [`Token`]s.
///
/// # Arguments
///
/// * `input` - The formula text.
///
/// # Returns
///
/// * `Ok(Vec<Token>)` with the tokens in source order.
/// * `Err(LexError)` on an unknown symbol, an unbalanced bracket, a malformed
///   literal, a `not` without operand or an invalid degree marker.
///
/// # Examples
///
/// ```
/// use formulasym::token::{OperatorKind, Token};
/// use formulasym::tokenize;
///
/// let tokens = tokenize("2x").unwrap();
/// assert_eq!(tokens, vec![Token::Number(2.0), Token::Identifier("x".into())]);
///
/// let tokens = tokenize("-1").unwrap();
/// assert_eq!(tokens, vec![Token::Operator(OperatorKind::Negate), Token::Number(1.0)]);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    lexer.run()?;
    log::debug!("tokenize: {} token(s) from {:?}", lexer.tokens.len(), input);
    Ok(lexer.tokens)
}
