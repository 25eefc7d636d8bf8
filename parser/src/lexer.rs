//! Converts the text of a declaration file into tokens.
use alarmgen_dsl::core::{FileId, SourceSpan};
use log::trace;
use logos::Logos;

use crate::token::{Token, TokenType};

/// Tokenize a declaration file.
///
/// Characters that are not part of any token (for example operators that
/// only occur in initial values) are skipped. The declarations we extract
/// never depend on them.
pub fn tokenize(source: &str, file_id: &FileId) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenType::lexer(source);
    let mut line: usize = 0;

    while let Some(token) = lexer.next() {
        match token {
            Ok(token_type) => {
                tokens.push(Token {
                    token_type,
                    span: SourceSpan::range(lexer.span().start, lexer.span().end, file_id),
                    line,
                    text: lexer.slice().into(),
                });

                line += match token_type {
                    TokenType::Newline => 1,
                    // Block comments may span lines
                    TokenType::Comment | TokenType::Pragma | TokenType::String => {
                        lexer.slice().matches('\n').count()
                    }
                    _ => 0,
                };
            }
            Err(_) => {
                trace!(
                    "Skipping unrecognized text '{}' in {} at {}",
                    lexer.slice(),
                    file_id,
                    lexer.span().start
                );
                line += lexer.slice().matches('\n').count();
            }
        }
    }

    tokens
}
