//! Parses constant value expressions.
//!
//! The grammar is a small subset of structured text expressions:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | MOD) unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := integer | type '#' integer | identifier | '(' expr ')'
//! ```
use alarmgen_dsl::core::SourceSpan;
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_dsl::expression::{BinaryOp, Expr};
use alarmgen_problems::Problem;

use crate::lexer::tokenize;
use crate::token::{parse_integer, Token, TokenType};

/// Parses the expression text of a constant. The span locates the
/// constant declaration for diagnostics.
pub fn parse_expression(text: &str, span: &SourceSpan) -> Result<Expr, Diagnostic> {
    let tokens: Vec<Token> = tokenize(text, &span.file_id)
        .into_iter()
        .filter(|t| !t.token_type.is_trivia())
        .collect();

    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        text,
        span,
    };
    let expr = parser.expr()?;
    if let Some(token) = parser.tokens.get(parser.pos) {
        return Err(parser.error(format!("Unexpected '{}'", token.text)));
    }
    Ok(expr)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    text: &'a str,
    span: &'a SourceSpan,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<TokenType> {
        self.tokens.get(self.pos).map(|t| t.token_type)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn error(&self, message: String) -> Diagnostic {
        Diagnostic::problem(Problem::ConstantMalformed, Label::span(self.span, message))
            .with_context("value", self.text)
    }

    fn expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(TokenType::Plus) => BinaryOp::Add,
                Some(TokenType::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn term(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenType::Star) => BinaryOp::Mul,
                Some(TokenType::Slash) => BinaryOp::Div,
                Some(TokenType::Mod) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, Diagnostic> {
        match self.peek() {
            Some(TokenType::Minus) => {
                self.pos += 1;
                Ok(Expr::Negate(Box::new(self.unary()?)))
            }
            Some(TokenType::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, Diagnostic> {
        let Some(token) = self.advance().cloned() else {
            return Err(self.error(String::from("Expression ends unexpectedly")));
        };
        match token.token_type {
            TokenType::Integer => self.integer(&token),
            TokenType::Identifier => {
                // Typed literal such as INT#5
                if self.peek() == Some(TokenType::Hash) {
                    self.pos += 1;
                    match self.advance().cloned() {
                        Some(value) if value.token_type == TokenType::Integer => {
                            self.integer(&value)
                        }
                        _ => Err(self.error(format!("Expected integer after '{}#'", token.text))),
                    }
                } else {
                    Ok(Expr::Symbol(token.text))
                }
            }
            TokenType::LeftParen => {
                let inner = self.expr()?;
                let closed = self
                    .advance()
                    .is_some_and(|t| t.token_type == TokenType::RightParen);
                if closed {
                    Ok(inner)
                } else {
                    Err(self.error(String::from("Expected ')'")))
                }
            }
            _ => Err(self.error(format!("Unexpected '{}'", token.text))),
        }
    }

    fn integer(&self, token: &Token) -> Result<Expr, Diagnostic> {
        parse_integer(&token.text)
            .map(Expr::Integer)
            .ok_or_else(|| self.error(format!("'{}' is not a valid integer", token.text)))
    }
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::core::SourceSpan;
    use alarmgen_dsl::expression::{BinaryOp, Expr};
    use proptest::prelude::*;

    use super::parse_expression;

    fn parse(text: &str) -> Result<Expr, alarmgen_dsl::diagnostic::Diagnostic> {
        parse_expression(text, &SourceSpan::default())
    }

    #[test]
    fn parse_expression_when_precedence_then_multiplication_binds_tighter() {
        let expr = parse("1 + 2 * A").unwrap();

        assert_eq!(
            Expr::binary(
                BinaryOp::Add,
                Expr::Integer(1),
                Expr::binary(BinaryOp::Mul, Expr::Integer(2), Expr::Symbol(String::from("A")))
            ),
            expr
        );
    }

    #[test]
    fn parse_expression_when_parentheses_and_mod_then_tree() {
        let expr = parse("(A + 1) MOD 4").unwrap();

        assert_eq!("((A + 1) MOD 4)", expr.to_string());
    }

    #[test]
    fn parse_expression_when_unary_minus_then_negate() {
        assert_eq!("-5", parse("-5").unwrap().to_string());
    }

    #[test]
    fn parse_expression_when_typed_literal_then_integer() {
        assert_eq!(Expr::Integer(255), parse("UINT#16#FF").unwrap());
    }

    #[test]
    fn parse_expression_when_string_then_err() {
        assert!(parse("'Line'").is_err());
    }

    #[test]
    fn parse_expression_when_real_then_err() {
        assert!(parse("1.5").is_err());
    }

    #[test]
    fn parse_expression_when_unclosed_parenthesis_then_err() {
        let err = parse("(1 + 2").unwrap_err();

        assert_eq!("P0101", err.code);
    }

    #[test]
    fn parse_expression_when_empty_then_err() {
        assert!(parse("").is_err());
    }

    proptest! {
        #[test]
        fn parse_expression_when_any_text_then_no_panic(text in "\\PC*") {
            let _ = parse(&text);
        }

        #[test]
        fn parse_expression_when_integer_then_same_value(value in 0i64..i64::MAX) {
            prop_assert_eq!(Expr::Integer(value), parse(&value.to_string()).unwrap());
        }
    }
}
