//! Provides definitions of tokens in declaration files.
use alarmgen_dsl::core::SourceSpan;
use logos::Logos;

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\f]+")]
pub enum TokenType {
    #[regex(r"\r?\n")]
    #[token("\r")]
    Newline,

    #[regex(r"\(\*[^*]*\*+([^*)][^*]*\*+)*\)")]
    Comment,

    #[regex(r"//[^\r\n]*")]
    LineComment,

    #[regex(r"\{[^}]*\}")]
    Pragma,

    #[regex(r"'[^']*'")]
    #[regex("\"[^\"]*\"")]
    String,

    // Grouping and other markers
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(":=")]
    Assign,
    #[token("..")]
    Range,
    #[token(".")]
    Period,
    #[token("#")]
    Hash,

    // Arithmetic in constant expressions
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("MOD", ignore(case))]
    Mod,

    // Keywords
    #[token("TYPE", ignore(case))]
    Type,
    #[token("END_TYPE", ignore(case))]
    EndType,
    #[token("STRUCT", ignore(case))]
    Struct,
    #[token("END_STRUCT", ignore(case))]
    EndStruct,
    #[token("VAR", ignore(case))]
    Var,
    #[token("END_VAR", ignore(case))]
    EndVar,
    #[token("RETAIN", ignore(case))]
    Retain,
    #[token("CONSTANT", ignore(case))]
    Constant,
    #[token("ARRAY", ignore(case))]
    Array,
    #[token("OF", ignore(case))]
    Of,

    /// Decimal integer or based integer such as `16#FF`.
    #[regex(r"[0-9][0-9_]*(#[0-9A-Fa-f_]+)?")]
    Integer,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
}

impl TokenType {
    /// Returns true for tokens that carry no meaning for declarations.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenType::Newline | TokenType::Comment | TokenType::LineComment | TokenType::Pragma
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
    /// The line number of the token (0-indexed).
    pub line: usize,
    pub text: String,
}

impl Token {
    /// Returns the content of a `(* ... *)` comment without the delimiters.
    pub fn comment_text(&self) -> &str {
        self.text
            .strip_prefix("(*")
            .and_then(|t| t.strip_suffix("*)"))
            .unwrap_or(&self.text)
            .trim()
    }
}

/// Parses the text of an integer token, including based integers such
/// as `2#1010` and `16#FF`. Underscores are digit separators.
pub fn parse_integer(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    match digits.split_once('#') {
        Some((base, value)) => {
            let base = base.parse::<u32>().ok()?;
            if !matches!(base, 2 | 8 | 16) {
                return None;
            }
            i64::from_str_radix(value, base).ok()
        }
        None => digits.parse::<i64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integer_when_decimal_with_separator_then_value() {
        assert_eq!(Some(1000), parse_integer("1_000"));
    }

    #[test]
    fn parse_integer_when_hex_then_value() {
        assert_eq!(Some(255), parse_integer("16#FF"));
    }

    #[test]
    fn parse_integer_when_unsupported_base_then_none() {
        assert_eq!(None, parse_integer("7#12"));
    }

    #[test]
    fn lexer_when_keyword_in_lower_case_then_keyword() {
        let mut lex = TokenType::lexer("end_struct");
        assert_eq!(Some(Ok(TokenType::EndStruct)), lex.next());
    }

    #[test]
    fn lexer_when_identifier_starts_with_keyword_then_identifier() {
        let mut lex = TokenType::lexer("VAR_GLOBAL");
        assert_eq!(Some(Ok(TokenType::Identifier)), lex.next());
    }

    #[test]
    fn lexer_when_comment_contains_star_then_one_comment() {
        let mut lex = TokenType::lexer("(* a * b *)");
        assert_eq!(Some(Ok(TokenType::Comment)), lex.next());
        assert_eq!(None, lex.next());
    }

    #[test]
    fn lexer_when_annotation_then_one_comment() {
        let mut lex = TokenType::lexer("(*Code=1*)");
        assert_eq!(Some(Ok(TokenType::Comment)), lex.next());
        assert_eq!("(*Code=1*)", lex.slice());
        assert_eq!(None, lex.next());
    }

    #[test]
    fn lexer_when_comment_has_parens_and_stars_then_one_comment() {
        let mut lex = TokenType::lexer("(* (a) ** b *) ;");
        assert_eq!(Some(Ok(TokenType::Comment)), lex.next());
        assert_eq!("(* (a) ** b *)", lex.slice());
        assert_eq!(Some(Ok(TokenType::Semicolon)), lex.next());
    }

    #[test]
    fn lexer_when_two_comments_then_two_tokens() {
        let mut lex = TokenType::lexer("(*Door open*) (*Code=1002*)");
        assert_eq!(Some(Ok(TokenType::Comment)), lex.next());
        assert_eq!("(*Door open*)", lex.slice());
        assert_eq!(Some(Ok(TokenType::Comment)), lex.next());
        assert_eq!("(*Code=1002*)", lex.slice());
        assert_eq!(None, lex.next());
    }

    #[test]
    fn lexer_when_range_then_range_token() {
        let mut lex = TokenType::lexer("1..MAX");
        assert_eq!(Some(Ok(TokenType::Integer)), lex.next());
        assert_eq!(Some(Ok(TokenType::Range)), lex.next());
        assert_eq!(Some(Ok(TokenType::Identifier)), lex.next());
    }
}
