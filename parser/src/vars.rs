//! Extracts global variables and constants from `VAR` sections.
//!
//! ## Recognized
//!
//! ```text
//! VAR
//!     gMachine : MachineType;
//!     gAxes : ARRAY[1..MAX_AXES] OF AxisType;
//!     gLeft, gRight : {REDUND_UNREPLICABLE} DoorType;
//! END_VAR
//! VAR RETAIN
//!     gCounters : CounterType;
//! END_VAR
//! VAR CONSTANT
//!     MAX_AXES : USINT := 2 * AXES_PER_STATION;
//! END_VAR
//! ```
use alarmgen_dsl::core::SourceSpan;
use alarmgen_dsl::declaration::{ConstantDecl, VariableDecl};
use log::{trace, warn};

use crate::cursor::Cursor;
use crate::token::{Token, TokenType};
use crate::types::{parse_bounds, Dimensions};

const STOP: &[TokenType] = &[TokenType::EndVar];
const STATEMENT_STOP: &[TokenType] = &[TokenType::Semicolon, TokenType::EndVar];

pub(crate) fn parse_sections(
    tokens: &[Token],
    source: &str,
) -> (Vec<VariableDecl>, Vec<ConstantDecl>) {
    let mut variables = vec![];
    let mut constants = vec![];
    let mut cursor = Cursor::new(tokens);

    while let Some(token) = cursor.next() {
        if token.token_type != TokenType::Var {
            continue;
        }

        let is_constant = if cursor.accept(TokenType::Constant).is_some() {
            true
        } else {
            cursor.accept(TokenType::Retain);
            cursor.accept(TokenType::Constant).is_some()
        };

        trace!(
            "Found {} section at line {}",
            if is_constant { "constant" } else { "variable" },
            token.line
        );

        while let Some(next) = cursor.peek() {
            match next.token_type {
                TokenType::EndVar => {
                    cursor.next();
                    break;
                }
                TokenType::Identifier => {
                    let names = parse_names(&mut cursor);
                    if names.is_empty() {
                        continue;
                    }
                    if is_constant {
                        parse_constant(&mut cursor, &names, source, &mut constants);
                    } else {
                        parse_variable(&mut cursor, &names, &mut variables);
                    }
                }
                _ => {
                    cursor.next();
                }
            }
        }
    }

    (variables, constants)
}

/// Parses `name [, name]* :`. Returns an empty list and skips the
/// declaration if it does not match.
fn parse_names<'a>(cursor: &mut Cursor<'a>) -> Vec<&'a Token> {
    let mut names = vec![];
    while let Some(name) = cursor.accept(TokenType::Identifier) {
        names.push(name);
        if cursor.accept(TokenType::Comma).is_none() {
            break;
        }
    }
    if cursor.accept(TokenType::Colon).is_none() {
        cursor.skip_past(TokenType::Semicolon, STOP);
        return vec![];
    }
    names
}

fn parse_variable(cursor: &mut Cursor, names: &[&Token], variables: &mut Vec<VariableDecl>) {
    let bounds = if cursor.accept(TokenType::Array).is_some() {
        match parse_bounds(cursor) {
            Some(Dimensions::One(bounds)) => Some(bounds),
            Some(Dimensions::Many) => {
                warn!(
                    "Variable {} is a multi-dimensional array and is ignored",
                    names[0].text
                );
                cursor.skip_past(TokenType::Semicolon, STOP);
                return;
            }
            None => {
                cursor.skip_past(TokenType::Semicolon, STOP);
                return;
            }
        }
    } else {
        None
    };

    let Some(type_name) = cursor.accept(TokenType::Identifier) else {
        cursor.skip_past(TokenType::Semicolon, STOP);
        return;
    };
    let Some(end) = cursor.skip_past(TokenType::Semicolon, STOP) else {
        return;
    };

    for name in names {
        variables.push(VariableDecl {
            name: name.text.clone(),
            type_name: type_name.text.clone(),
            bounds: bounds.clone(),
            span: SourceSpan::join(&name.span, &end.span),
        });
    }
}

fn parse_constant(
    cursor: &mut Cursor,
    names: &[&Token],
    source: &str,
    constants: &mut Vec<ConstantDecl>,
) {
    let Some(type_name) = cursor.accept(TokenType::Identifier) else {
        cursor.skip_past(TokenType::Semicolon, STOP);
        return;
    };
    let Some(assign) = cursor.skip_past(TokenType::Assign, STATEMENT_STOP) else {
        cursor.skip_past(TokenType::Semicolon, STOP);
        return;
    };
    let Some(end) = cursor.skip_past(TokenType::Semicolon, STOP) else {
        return;
    };

    let value = source
        .get(assign.span.end..end.span.start)
        .unwrap_or_default()
        .trim()
        .to_string();

    for name in names {
        constants.push(ConstantDecl {
            name: name.text.clone(),
            type_name: type_name.text.clone(),
            value: value.clone(),
            span: SourceSpan::join(&name.span, &end.span),
        });
    }
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::core::FileId;
    use alarmgen_dsl::declaration::{Bound, ConstantDecl, VariableDecl};

    use super::parse_sections;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> (Vec<VariableDecl>, Vec<ConstantDecl>) {
        parse_sections(&tokenize(source, &FileId::default()), source)
    }

    #[test]
    fn parse_sections_when_var_section_then_variables() {
        let (variables, constants) = parse(
            "VAR
	gMachine : MachineType; (*Machine*)
	gLeft, gRight : {REDUND_UNREPLICABLE} DoorType;
END_VAR",
        );

        assert!(constants.is_empty());
        assert_eq!(3, variables.len());
        assert_eq!("gMachine", variables[0].name);
        assert_eq!("MachineType", variables[0].type_name);
        assert_eq!("gRight", variables[2].name);
        assert_eq!("DoorType", variables[2].type_name);
    }

    #[test]
    fn parse_sections_when_retain_section_with_array_then_bounds() {
        let (variables, _) = parse(
            "VAR RETAIN
	gAxes : ARRAY[0..MAX_AXES] OF AxisType := [3(0)];
END_VAR",
        );

        let bounds = variables[0].bounds.as_ref().unwrap();
        assert_eq!(Bound::Literal(0), bounds.low);
        assert_eq!(Bound::Symbol(String::from("MAX_AXES")), bounds.high);
        assert_eq!("AxisType", variables[0].type_name);
    }

    #[test]
    fn parse_sections_when_constant_section_then_value_text() {
        let (variables, constants) = parse(
            "VAR CONSTANT
	MAX_AXES : USINT := 2 * (AXES + 1); (*Number of axes*)
	NAME : STRING[10] := 'Line';
END_VAR",
        );

        assert!(variables.is_empty());
        assert_eq!(2, constants.len());
        assert_eq!("MAX_AXES", constants[0].name);
        assert_eq!("USINT", constants[0].type_name);
        assert_eq!("2 * (AXES + 1)", constants[0].value);
        assert_eq!("'Line'", constants[1].value);
    }

    #[test]
    fn parse_sections_when_constant_without_value_then_skipped() {
        let (_, constants) = parse(
            "VAR CONSTANT
	A : INT;
	B : INT := 4;
END_VAR",
        );

        assert_eq!(1, constants.len());
        assert_eq!("B", constants[0].name);
    }

    #[test]
    fn parse_sections_when_lower_case_keywords_then_variables() {
        let (variables, _) = parse("var\n\tgLine : LineType;\nend_var");

        assert_eq!(1, variables.len());
    }
}
