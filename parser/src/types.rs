//! Extracts structure members from `TYPE` blocks.
//!
//! ## Recognized
//!
//! ```text
//! TYPE
//!     MotorErrorType : STRUCT
//!         Overload : BOOL; (*Motor overload*) (*Code=1001 Behavior.Retain=TRUE*)
//!         Phases : ARRAY[1..PHASES] OF BOOL; (*Phase lost*) (*Code=1002*)
//!     END_STRUCT;
//! END_TYPE
//! ```
//!
//! ## Skipped
//!
//! Enumerations, subranges, aliases and multi-dimensional arrays.
use alarmgen_dsl::core::SourceSpan;
use alarmgen_dsl::declaration::{Bound, BoundsDecl, MemberDecl};
use log::{trace, warn};

use crate::cursor::Cursor;
use crate::token::{parse_integer, Token, TokenType};

pub(crate) fn parse_members(tokens: &[Token]) -> Vec<MemberDecl> {
    let mut members = vec![];
    let mut cursor = Cursor::new(tokens);

    while let Some(token) = cursor.next() {
        if token.token_type != TokenType::Identifier {
            continue;
        }
        let is_struct = cursor.peek_is(TokenType::Colon)
            && cursor
                .peek_nth(1)
                .is_some_and(|t| t.token_type == TokenType::Struct);
        if !is_struct {
            continue;
        }
        cursor.next();
        cursor.next();
        trace!("Found structure {}", token.text);
        parse_struct_body(&mut cursor, &token.text, &mut members);
    }

    members
}

fn parse_struct_body(cursor: &mut Cursor, parent_type: &str, members: &mut Vec<MemberDecl>) {
    while let Some(token) = cursor.next() {
        match token.token_type {
            TokenType::EndStruct => return,
            TokenType::Identifier => {
                if let Some(member) = parse_member(cursor, token, parent_type) {
                    members.push(member);
                }
            }
            _ => {}
        }
    }
}

/// Parses a member after the member name.
fn parse_member(cursor: &mut Cursor, name: &Token, parent_type: &str) -> Option<MemberDecl> {
    const STOP: &[TokenType] = &[TokenType::EndStruct];

    if cursor.accept(TokenType::Colon).is_none() {
        cursor.skip_past(TokenType::Semicolon, STOP);
        return None;
    }

    let bounds = if cursor.accept(TokenType::Array).is_some() {
        match parse_bounds(cursor) {
            Some(Dimensions::One(bounds)) => Some(bounds),
            Some(Dimensions::Many) => {
                warn!(
                    "Member {}.{} is a multi-dimensional array and is ignored",
                    parent_type, name.text
                );
                cursor.skip_past(TokenType::Semicolon, STOP);
                return None;
            }
            None => {
                cursor.skip_past(TokenType::Semicolon, STOP);
                return None;
            }
        }
    } else {
        None
    };

    let type_name = match cursor.peek() {
        Some(t) if t.token_type == TokenType::Identifier => {
            cursor.next();
            t.text.clone()
        }
        _ => {
            cursor.skip_past(TokenType::Semicolon, STOP);
            return None;
        }
    };

    let end = cursor.skip_past(TokenType::Semicolon, STOP)?;
    let comments = cursor.trailing_comments();
    let annotation = comments
        .get(1)
        .map(|c| c.comment_text().to_string())
        .unwrap_or_default();

    Some(MemberDecl {
        name: name.text.clone(),
        type_name,
        bounds,
        annotation,
        parent_type: parent_type.to_string(),
        span: SourceSpan::join(&name.span, &end.span),
    })
}

pub(crate) enum Dimensions {
    One(BoundsDecl),
    Many,
}

/// Parses `[low..high] OF` after the `ARRAY` keyword.
pub(crate) fn parse_bounds(cursor: &mut Cursor) -> Option<Dimensions> {
    cursor.accept(TokenType::LeftBracket)?;
    let low = parse_bound(cursor)?;
    cursor.accept(TokenType::Range)?;
    let high = parse_bound(cursor)?;

    if cursor.peek_is(TokenType::Comma) {
        return Some(Dimensions::Many);
    }
    cursor.accept(TokenType::RightBracket)?;
    cursor.accept(TokenType::Of)?;

    Some(Dimensions::One(BoundsDecl { low, high }))
}

fn parse_bound(cursor: &mut Cursor) -> Option<Bound> {
    let negative = cursor.accept(TokenType::Minus).is_some();
    let token = cursor.next()?;
    match token.token_type {
        TokenType::Integer => {
            let value = parse_integer(&token.text)?;
            Some(Bound::Literal(if negative { -value } else { value }))
        }
        TokenType::Identifier if !negative => Some(Bound::Symbol(token.text.clone())),
        _ => None,
    }
}
