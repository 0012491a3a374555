//! Regex parsing: preprocessing, postfix conversion and syntax trees.
//!
//! The supported syntax is deliberately small:
//! - symbols: any character that is not an operator or parenthesis
//! - `|` union, `^` concatenation (normally implicit)
//! - `*` zero-or-more, `+` one-or-more, `?` optional
//! - `(...)` grouping
//! - `ε` the empty string
//!
//! Parsing runs regex → tokens with explicit concatenation → postfix →
//! [`SyntaxTree`]. Trees parsed with [`SyntaxTree::parse_augmented`] can be
//! wrapped in an [`AttributedTree`] for the direct DFA construction.

mod attributes;
mod error;
mod postfix;
mod preprocess;
mod tree;

pub use attributes::{AttributedTree, Attributes, Position, PositionSet};
pub use error::SyntaxError;
pub use postfix::to_postfix;
pub use preprocess::{
    alphabet, explicit_concat, insert_concat, render, tokenize, Token, TokenKind, EPSILON,
};
pub use tree::{Leaf, Node, NodeId, SyntaxTree, TreeMode, END_MARKER};
