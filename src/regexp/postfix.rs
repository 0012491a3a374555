//! Infix to postfix conversion (shunting-yard).

use log::debug;

use super::error::SyntaxError;
use super::preprocess::{render, Token, TokenKind};
use crate::config::{Config, Operator};

/// Convert tokens with explicit concatenation into postfix order.
///
/// Operators of equal precedence associate to the left. Parentheses are
/// dropped from the output; an unmatched one on either side is an error.
/// An operator missing an operand is reported at its own offset.
pub fn to_postfix(tokens: &[Token], config: &Config) -> Result<Vec<Token>, SyntaxError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    let mut depth = 0usize;
    // last token seen, `None` at the start
    let mut previous: Option<Token> = None;

    for &token in tokens {
        check_operands(previous, token)?;
        previous = Some(token);
        match token.kind {
            TokenKind::Symbol(_) | TokenKind::Epsilon => output.push(token),
            TokenKind::Open => {
                depth += 1;
                if depth > config.max_nesting {
                    return Err(SyntaxError::NestingTooDeep {
                        limit: config.max_nesting,
                        offset: token.offset,
                    });
                }
                stack.push(token);
            }
            TokenKind::Close => {
                loop {
                    match stack.pop() {
                        Some(Token {
                            kind: TokenKind::Open,
                            ..
                        }) => break,
                        Some(op) => output.push(op),
                        None => {
                            return Err(SyntaxError::UnbalancedParenthesis {
                                offset: token.offset,
                            })
                        }
                    }
                }
                depth -= 1;
            }
            TokenKind::Op(op) => {
                let precedence = config.operators.precedence(op);
                while let Some(&top) = stack.last() {
                    let TokenKind::Op(top_op) = top.kind else {
                        break;
                    };
                    if config.operators.precedence(top_op) < precedence {
                        break;
                    }
                    output.push(top);
                    stack.pop();
                }
                stack.push(token);
            }
        }
    }

    if let Some((operator, prev)) = previous.and_then(|t| Some((binary_operator(t)?, t))) {
        return Err(SyntaxError::IncompleteBinary {
            operator,
            offset: prev.offset,
        });
    }

    while let Some(top) = stack.pop() {
        if top.kind == TokenKind::Open {
            return Err(SyntaxError::UnbalancedParenthesis { offset: top.offset });
        }
        output.push(top);
    }

    debug!("postfix obtained: {}", render(&output));
    Ok(output)
}

/// Reject `token` when it is an operator whose left operand is missing, or a
/// `)` right after a binary operator.
fn check_operands(previous: Option<Token>, token: Token) -> Result<(), SyntaxError> {
    let pending = previous.and_then(binary_operator);
    let expects_operand = match previous {
        None => true,
        Some(prev) => prev.kind == TokenKind::Open || pending.is_some(),
    };
    if !expects_operand {
        return Ok(());
    }
    match (token.kind, previous, pending) {
        (TokenKind::Op(operator), _, _) if operator.is_unary() => {
            Err(SyntaxError::IncompleteUnary {
                operator,
                offset: token.offset,
            })
        }
        (TokenKind::Op(operator), _, _) => Err(SyntaxError::IncompleteBinary {
            operator,
            offset: token.offset,
        }),
        (TokenKind::Close, Some(prev), Some(operator)) => Err(SyntaxError::IncompleteBinary {
            operator,
            offset: prev.offset,
        }),
        _ => Ok(()),
    }
}

#[inline]
fn binary_operator(token: Token) -> Option<Operator> {
    match token.kind {
        TokenKind::Op(op) if !op.is_unary() => Some(op),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Operators;
    use crate::regexp::preprocess::explicit_concat;

    fn postfix(regex: &str) -> Result<String, SyntaxError> {
        to_postfix(&explicit_concat(regex), &Config::default()).map(|t| render(&t))
    }

    #[test]
    fn test_postfix_precedence() {
        assert_eq!(postfix("(a|b)c").unwrap(), "ab|c^");
        assert_eq!(postfix("a|bc").unwrap(), "abc^|");
        assert_eq!(postfix("ab*").unwrap(), "ab*^");
        assert_eq!(postfix("a|b*").unwrap(), "ab*|");
    }

    #[test]
    fn test_postfix_left_associative() {
        assert_eq!(postfix("abc").unwrap(), "ab^c^");
        assert_eq!(postfix("a|b|c").unwrap(), "ab|c|");
    }

    #[test]
    fn test_postfix_unary_chain() {
        assert_eq!(postfix("a*?").unwrap(), "a*?");
        assert_eq!(postfix("(ab)+").unwrap(), "ab^+");
    }

    #[test]
    fn test_postfix_textbook_example() {
        assert_eq!(postfix("(a|b)*abb").unwrap(), "ab|*a^b^b^");
    }

    #[test]
    fn test_postfix_unbalanced_close() {
        assert_eq!(
            postfix("a)b"),
            Err(SyntaxError::UnbalancedParenthesis { offset: 1 })
        );
    }

    #[test]
    fn test_postfix_unbalanced_open() {
        assert_eq!(
            postfix("(ab"),
            Err(SyntaxError::UnbalancedParenthesis { offset: 0 })
        );
    }

    #[test]
    fn test_postfix_reports_operator_missing_left_operand() {
        assert_eq!(
            postfix("a(|b)"),
            Err(SyntaxError::IncompleteBinary {
                operator: Operator::Union,
                offset: 2
            })
        );
        assert_eq!(
            postfix("a||b"),
            Err(SyntaxError::IncompleteBinary {
                operator: Operator::Union,
                offset: 2
            })
        );
        assert_eq!(
            postfix("(*a)"),
            Err(SyntaxError::IncompleteUnary {
                operator: Operator::Star,
                offset: 1
            })
        );
    }

    #[test]
    fn test_postfix_reports_operator_missing_right_operand() {
        assert_eq!(
            postfix("(a|)b"),
            Err(SyntaxError::IncompleteBinary {
                operator: Operator::Union,
                offset: 2
            })
        );
        assert_eq!(
            postfix("ab|"),
            Err(SyntaxError::IncompleteBinary {
                operator: Operator::Union,
                offset: 2
            })
        );
        // an empty group is left to the tree builder
        assert_eq!(postfix("()").unwrap(), "");
    }

    #[test]
    fn test_postfix_nesting_limit() {
        let config = Config::default().with_max_nesting(2);
        let tokens = explicit_concat("((a))");
        assert!(to_postfix(&tokens, &config).is_ok());

        let tokens = explicit_concat("(((a)))");
        assert_eq!(
            to_postfix(&tokens, &config),
            Err(SyntaxError::NestingTooDeep {
                limit: 2,
                offset: 2
            })
        );
    }

    #[test]
    fn test_postfix_custom_precedence() {
        // union binding tighter than concat
        let ops =
            Operators::from_chars([('|', 2), ('^', 1), ('*', 3), ('?', 3), ('+', 3)]).unwrap();
        let config = Config::default().with_operators(ops);
        let tokens = explicit_concat("ab|c");
        let out = to_postfix(&tokens, &config).unwrap();
        assert_eq!(render(&out), "abc|^");
    }
}
