//! Creates an alarm for every annotated boolean in an alarm structure.
//!
//! ## Passes
//!
//! ```text
//! MotorErrorType : STRUCT
//!     Overload : BOOL; (*Motor overload*) (*Code=1001*)
//! END_STRUCT;
//! ```
//!
//! ## Skipped
//!
//! Booleans without an annotation and members of other types.
use std::collections::HashMap;

use alarmgen_dsl::model::{Alarm, AlarmPath, RecordTypeMember, Severity};
use log::{debug, trace};

use crate::severity::classify;

/// Acknowledgment keywords and the value each is replaced with. Longer
/// keywords come first because they contain the shorter ones.
const ACKNOWLEDGE_KEYWORDS: [(&str, &str); 4] = [
    ("RequiredAndResettable", "3"),
    ("RequiredAfterActive", "2"),
    ("Required", "1"),
    ("Disabled", "0"),
];

pub fn apply(paths: &[AlarmPath], members: &[RecordTypeMember]) -> Vec<Alarm> {
    let mut severities: HashMap<&str, Option<Severity>> = HashMap::new();
    let mut alarms = vec![];

    for path in paths {
        let Some(last) = path.last() else {
            continue;
        };
        let container = last.type_name.as_str();
        let severity = *severities
            .entry(container)
            .or_insert_with(|| classify(container));
        let Some(severity) = severity else {
            trace!("Type {} does not hold alarms", container);
            continue;
        };

        for member in members.iter().filter(|m| m.parent_type == container) {
            if !member.type_name.eq_ignore_ascii_case("BOOL") {
                continue;
            }
            if member.annotation.trim().is_empty() {
                trace!(
                    "Member {}.{} has no annotation and is not an alarm",
                    container,
                    member.name
                );
                continue;
            }
            alarms.push(Alarm {
                variable_name: member.name.clone(),
                bounds: member.bounds,
                path: path.clone(),
                severity,
                annotation: normalize_acknowledge(&member.annotation),
                properties: vec![],
            });
        }
    }

    debug!("Created {} alarms", alarms.len());
    alarms
}

/// Replaces the acknowledgment keywords in the annotation with their
/// numeric values.
pub fn normalize_acknowledge(annotation: &str) -> String {
    ACKNOWLEDGE_KEYWORDS
        .iter()
        .fold(annotation.to_string(), |text, (keyword, value)| {
            text.replace(keyword, value)
        })
}
