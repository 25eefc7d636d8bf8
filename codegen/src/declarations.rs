//! Declarations that the generated program needs.
//!
//! The program declares its local variables in `<program>.var` and the
//! latch type `FlagType` in `<program>.typ`. `FlagType` mirrors the alarm
//! paths: every structure on the way to an alarm structure gets a flag
//! structure named after it (`StationType` becomes `StationFlagType`) and
//! the alarm structure itself is used as it is.
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::Diagnostic;
use alarmgen_dsl::model::{Alarm, AlarmPath, PathSegment};
use log::{debug, trace};

use crate::program::{index_variable, FLAG_VARIABLE, NAME_VARIABLE, STRING_VARIABLE};
use crate::sentinel::replace_region;

const FLAG_TYPE: &str = "FlagType";
const PLACEHOLDER_MEMBER: &str = "New_Member : USINT;";

/// Returns the variable file with the variables that the program uses and
/// that the file does not declare yet.
pub fn update_variables(text: &str, max_loops: usize) -> String {
    let mut missing = vec![];

    let flag = format!("{} : {};", FLAG_VARIABLE, FLAG_TYPE);
    if !text.contains(&flag) {
        missing.push(format!("{} (*Flag structure used for edge detection*)", flag));
    }

    if max_loops > 0 {
        let name = format!("{} : STRING[255];", NAME_VARIABLE);
        if !text.contains(&name) {
            missing.push(format!("{} (*Auxiliary string for composing alarms name*)", name));
        }
        let string = format!("{} : STRING[255];", STRING_VARIABLE);
        if !text.contains(&string) {
            missing.push(format!(
                "{} (*Auxiliary string for converting numbers to string*)",
                string
            ));
        }
    }

    for level in 1..=max_loops {
        let index = format!("{} : INT;", index_variable(level));
        if !text.contains(&index) {
            missing.push(format!("{} (*Index for iteration in for loops*)", index));
        }
    }

    if missing.is_empty() {
        trace!("Program variables are declared");
        return text.to_string();
    }

    debug!("Declaring {} program variables", missing.len());
    let mut result = String::from(text);
    result.push_str("\nVAR");
    for declaration in missing {
        result.push_str("\n\t");
        result.push_str(&declaration);
    }
    result.push_str("\nEND_VAR");
    result
}

/// Replaces the generated region of the type file with the flag types.
pub fn update_flag_types(
    text: &str,
    alarms: &[Alarm],
    file_id: &FileId,
) -> Result<String, Diagnostic> {
    replace_region(text, &flag_types(alarms), file_id)
}

/// A structure in the generated type declarations.
struct FlagStructure {
    name: String,
    members: Vec<String>,
}

/// Returns the declarations of `FlagType` and the structures below it.
pub fn flag_types(alarms: &[Alarm]) -> String {
    let mut paths: Vec<&AlarmPath> = vec![];
    for alarm in alarms {
        if !paths.contains(&&alarm.path) {
            paths.push(&alarm.path);
        }
    }

    let mut structures = vec![FlagStructure {
        name: FLAG_TYPE.to_string(),
        members: vec![],
    }];

    for path in paths {
        let last = path.len().saturating_sub(1);
        for (idx, segment) in path.segments.iter().enumerate() {
            let member = member_declaration(segment, idx == last);
            let parent = match &segment.parent_type {
                Some(parent_type) if idx > 0 => flag_type_name(parent_type),
                _ => FLAG_TYPE.to_string(),
            };

            match structures.iter_mut().find(|s| s.name == parent) {
                Some(structure) => {
                    if !structure.members.contains(&member) {
                        structure.members.push(member);
                    }
                }
                None => structures.push(FlagStructure {
                    name: parent,
                    members: vec![member],
                }),
            }
        }
    }

    let mut text = String::from("\nTYPE");
    for structure in structures {
        if structure.name == FLAG_TYPE {
            text.push_str(&format!(
                "\n\t{} : STRUCT  (*Flag structure used for edge detection*)",
                FLAG_TYPE
            ));
        } else {
            text.push_str(&format!("\n\t{} : STRUCT", structure.name));
        }
        if structure.members.is_empty() {
            text.push_str("\n\t\t");
            text.push_str(PLACEHOLDER_MEMBER);
        }
        for member in structure.members {
            text.push_str("\n\t\t");
            text.push_str(&member);
        }
        text.push_str("\n\tEND_STRUCT;");
    }
    text.push_str("\nEND_TYPE\n\n");
    text
}

/// Returns the name of the flag structure for the structure type.
pub fn flag_type_name(type_name: &str) -> String {
    let base = type_name.strip_suffix("Type").unwrap_or(type_name);
    format!("{}{}", base, FLAG_TYPE)
}

fn member_declaration(segment: &PathSegment, is_alarm_structure: bool) -> String {
    let mut declaration = format!("{} : ", segment.name);
    if let Some(bounds) = segment.bounds {
        declaration.push_str(&format!("ARRAY[{}..{}]OF ", bounds.low, bounds.high));
    }
    if is_alarm_structure {
        declaration.push_str(&segment.type_name);
    } else {
        declaration.push_str(&flag_type_name(&segment.type_name));
    }
    declaration.push(';');
    declaration
}
