//! A position in a token stream that skips over comments and line breaks.
use crate::token::{Token, TokenType};

pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Returns the next significant token without consuming it.
    pub fn peek(&self) -> Option<&'a Token> {
        self.peek_nth(0)
    }

    /// Returns the significant token `n` tokens ahead without consuming it.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.token_type.is_trivia())
            .nth(n)
    }

    pub fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek().is_some_and(|t| t.token_type == token_type)
    }

    /// Consumes and returns the next significant token.
    pub fn next(&mut self) -> Option<&'a Token> {
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            if !token.token_type.is_trivia() {
                return Some(token);
            }
        }
        None
    }

    /// Consumes the next significant token if it has the type.
    pub fn accept(&mut self, token_type: TokenType) -> Option<&'a Token> {
        if self.peek_is(token_type) {
            self.next()
        } else {
            None
        }
    }

    /// Consumes tokens up to and including the next token of the type
    /// and returns it. Stops without consuming at any of the `stop` types.
    pub fn skip_past(&mut self, token_type: TokenType, stop: &[TokenType]) -> Option<&'a Token> {
        while let Some(token) = self.peek() {
            if stop.contains(&token.token_type) {
                return None;
            }
            self.next();
            if token.token_type == token_type {
                return Some(token);
            }
        }
        None
    }

    /// Consumes the block comments that follow on the same line as the
    /// previous token and returns them.
    pub fn trailing_comments(&mut self) -> Vec<&'a Token> {
        let mut comments = vec![];
        while let Some(token) = self.tokens.get(self.pos) {
            match token.token_type {
                TokenType::Comment => {
                    comments.push(token);
                    self.pos += 1;
                }
                TokenType::Pragma | TokenType::LineComment => {
                    self.pos += 1;
                }
                _ => break,
            }
        }
        comments
    }
}
