//! Tokenizing and explicit concatenation.
//!
//! Every character of the regex that is not an operator, a parenthesis or
//! `ε` is an alphabet symbol. Concatenation is implicit in the source; this
//! pass inserts a `^` token wherever one operand ends and the next begins.

use std::collections::BTreeSet;

use crate::config::Operator;

/// The empty-string marker. Never part of an alphabet.
pub const EPSILON: char = 'ε';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Symbol(char),
    Epsilon,
    Op(Operator),
    Open,
    Close,
}

/// A regex token and the character offset it came from.
///
/// Inserted concatenation tokens carry the offset of the token after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// True if an operand may end with this token.
    #[inline]
    fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::Symbol(_) | TokenKind::Epsilon | TokenKind::Close => true,
            TokenKind::Op(op) => op.is_unary(),
            TokenKind::Open => false,
        }
    }

    /// True if an operand may start with this token.
    #[inline]
    fn starts_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Symbol(_) | TokenKind::Epsilon | TokenKind::Open
        )
    }

    #[inline]
    pub fn as_char(&self) -> char {
        match self.kind {
            TokenKind::Symbol(c) => c,
            TokenKind::Epsilon => EPSILON,
            TokenKind::Op(op) => op.as_char(),
            TokenKind::Open => '(',
            TokenKind::Close => ')',
        }
    }
}

/// The alphabet of a regex: every character that is neither an operator,
/// a parenthesis nor `ε`.
pub fn alphabet(regex: &str) -> BTreeSet<char> {
    regex
        .chars()
        .filter(|&c| is_symbol(c))
        .collect()
}

#[inline]
fn is_symbol(c: char) -> bool {
    Operator::from_char(c).is_none() && c != '(' && c != ')' && c != EPSILON
}

/// Split a regex into tokens, one per character.
pub fn tokenize(regex: &str) -> Vec<Token> {
    regex
        .chars()
        .enumerate()
        .map(|(offset, c)| {
            let kind = match c {
                '(' => TokenKind::Open,
                ')' => TokenKind::Close,
                EPSILON => TokenKind::Epsilon,
                _ => match Operator::from_char(c) {
                    Some(op) => TokenKind::Op(op),
                    None => TokenKind::Symbol(c),
                },
            };
            Token::new(kind, offset)
        })
        .collect()
}

/// Insert a concatenation token between every adjacent operand pair.
pub fn insert_concat(tokens: &[Token]) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for (i, token) in tokens.iter().enumerate() {
        out.push(*token);
        if let Some(next) = tokens.get(i + 1) {
            if token.ends_operand() && next.starts_operand() {
                out.push(Token::new(TokenKind::Op(Operator::Concat), next.offset));
            }
        }
    }
    out
}

/// Tokenize and make concatenation explicit in one step.
pub fn explicit_concat(regex: &str) -> Vec<Token> {
    insert_concat(&tokenize(regex))
}

/// Render tokens back to regex text.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(Token::as_char).collect()
}
