//! Enumerates the names of the alarms.
//!
//! The name of an alarm is the dotted path from the global variable to the
//! boolean with one concrete index for every array on the way, for example
//! `gMachine.Stations[2].Errors.Overload[1]`. An array expands into one name
//! per index. Names are ordered outer array first.
use alarmgen_dsl::model::{Alarm, ArrayBounds};

/// Returns every name of the alarm.
pub fn alarm_names(alarm: &Alarm) -> Vec<String> {
    let mut names = vec![String::new()];

    for (idx, segment) in alarm.path.segments.iter().enumerate() {
        for name in names.iter_mut() {
            if idx > 0 {
                name.push('.');
            }
            name.push_str(&segment.name);
        }
        if let Some(bounds) = segment.bounds {
            names = expand(names, &bounds);
        }
    }

    for name in names.iter_mut() {
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(&alarm.variable_name);
    }
    if let Some(bounds) = alarm.bounds {
        names = expand(names, &bounds);
    }

    names
}

/// Returns the names of every alarm in alarm order.
pub fn all_names(alarms: &[Alarm]) -> Vec<String> {
    alarms.iter().flat_map(alarm_names).collect()
}

fn expand(names: Vec<String>, bounds: &ArrayBounds) -> Vec<String> {
    let mut expanded = vec![];
    for name in names {
        expanded.extend(bounds.indices().map(|idx| format!("{}[{}]", name, idx)));
    }
    expanded
}
