use thiserror::Error;

use crate::config::Operator;

/// Error type for regex syntax. Offsets count characters, not bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("empty expression")]
    Empty,
    #[error("unbalanced parenthesis at offset {offset}")]
    UnbalancedParenthesis { offset: usize },
    #[error("incomplete `{operator}` operation at offset {offset}: missing operand")]
    IncompleteUnary { operator: Operator, offset: usize },
    #[error("incomplete `{operator}` operation at offset {offset}: needs two operands")]
    IncompleteBinary { operator: Operator, offset: usize },
    #[error("{count} operands left without an operator joining them")]
    DanglingOperands { count: usize },
    #[error("parentheses nested deeper than {limit} at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}
