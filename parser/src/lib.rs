//! Extracts declarations from the text of `.var` and `.typ` files.
//!
//! The parser recognizes only the parts of the declaration language that
//! alarm generation needs: structure types and their members, global
//! variables and integer constants. Everything else is skipped without
//! an error.
extern crate alarmgen_dsl;

use alarmgen_dsl::{core::FileId, declaration::DeclarationSet};

pub mod annotation;
mod cursor;
pub mod expression;
pub mod lexer;
pub mod token;
mod types;
mod vars;

/// Parses the declarations in a source file.
///
/// Structure members, global variables and constants are extracted
/// regardless of the file extension so that a file may hold both types
/// and variables.
pub fn parse_declarations(source: &str, file_id: &FileId) -> DeclarationSet {
    let tokens = lexer::tokenize(source, file_id);

    let mut result = DeclarationSet::new();
    result.members = types::parse_members(&tokens);
    let (variables, constants) = vars::parse_sections(&tokens, source);
    result.variables = variables;
    result.constants = constants;
    result
}
