//! Parses the properties in alarm annotations and validates them against
//! the property schema.
//!
//! Problems with properties are not fatal. An unknown key, a value outside
//! the accepted values or a value of the wrong type is logged as a warning
//! and the property is marked invalid so that it is left out of the alarm
//! configuration.
use std::collections::HashSet;

use alarmgen_dsl::model::Alarm;
use alarmgen_dsl::property::{Property, ValidityRule};
use alarmgen_parser::annotation::parse_pairs;
use log::{trace, warn};

use crate::schema::{lookup, BEHAVIOR_KEY, DEFAULT_BEHAVIOR};

/// Attaches the properties to every alarm.
pub fn apply(alarms: Vec<Alarm>) -> Vec<Alarm> {
    alarms
        .into_iter()
        .map(|mut alarm| {
            alarm.properties = parse_properties(&alarm);
            alarm
        })
        .collect()
}

/// Returns the properties of the alarm sorted by key.
pub fn parse_properties(alarm: &Alarm) -> Vec<Property> {
    let mut keys: HashSet<String> = HashSet::new();
    let mut properties = vec![];

    for pair in parse_pairs(&alarm.annotation) {
        if !keys.insert(pair.key.clone()) {
            warn!(
                "Property {} of alarm {} is given more than once; using the first value",
                pair.key, alarm
            );
            continue;
        }
        properties.push(validate(pair.key, pair.value, alarm));
    }

    if !keys.contains(BEHAVIOR_KEY) {
        trace!("Alarm {} uses the default behavior", alarm);
        properties.push(default_behavior());
    }

    properties.sort_by(|a, b| a.key.cmp(&b.key));
    properties
}

fn default_behavior() -> Property {
    let entry = lookup(BEHAVIOR_KEY);
    Property {
        key: BEHAVIOR_KEY.to_string(),
        value: DEFAULT_BEHAVIOR.to_string(),
        valid: true,
        tag: entry.map(|e| e.tag),
        id: entry.map(|e| e.id),
    }
}

fn validate(key: String, value: String, alarm: &Alarm) -> Property {
    let Some(entry) = lookup(&key) else {
        warn!("Property {} of alarm {} is not a known property", key, alarm);
        return Property {
            key,
            value,
            valid: false,
            tag: None,
            id: None,
        };
    };

    let value = match entry.rule {
        ValidityRule::Boolean => value.to_uppercase(),
        _ => value,
    };

    let valid = match check(&entry.rule, &value) {
        Ok(true) => true,
        Ok(false) => {
            warn!(
                "Value {} of property {} of alarm {} is not {}",
                value,
                key,
                alarm,
                describe(&entry.rule)
            );
            false
        }
        Err(expected) => {
            warn!(
                "Value {} of property {} of alarm {} has the wrong data type; expected {}",
                value, key, alarm, expected
            );
            false
        }
    };

    Property {
        key,
        value,
        valid,
        tag: Some(entry.tag),
        id: Some(entry.id),
    }
}

/// Checks the value against the rule. Returns the expected type name when
/// the value is not a number as the rule requires.
pub fn check(rule: &ValidityRule, value: &str) -> Result<bool, &'static str> {
    match rule {
        ValidityRule::IntegerRange { low, high } => {
            let parsed: i64 = value.parse().map_err(|_| "an integer")?;
            Ok((*low..=*high).contains(&parsed))
        }
        ValidityRule::RealRange { low, high } => {
            let parsed: f64 = value.parse().map_err(|_| "a real number")?;
            Ok(*low <= parsed && parsed <= *high)
        }
        ValidityRule::OneOf(values) => Ok(values.iter().any(|v| *v == value)),
        ValidityRule::Boolean => Ok(value == "TRUE" || value == "FALSE"),
        ValidityRule::Unconstrained => Ok(true),
    }
}

fn describe(rule: &ValidityRule) -> String {
    match rule {
        ValidityRule::IntegerRange { low, high } => format!("in the range {}..{}", low, high),
        ValidityRule::RealRange { low, high } => format!("in the range {}..{}", low, high),
        ValidityRule::OneOf(values) => format!("one of {}", values.join(", ")),
        ValidityRule::Boolean => String::from("TRUE or FALSE"),
        ValidityRule::Unconstrained => String::from("accepted"),
    }
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::model::{Alarm, AlarmPath, Severity};
    use alarmgen_dsl::property::{Property, ValidityRule, XmlTag};
    use rstest::rstest;

    use super::{check, parse_properties};

    fn alarm(annotation: &str) -> Alarm {
        Alarm {
            variable_name: String::from("Overload"),
            bounds: None,
            path: AlarmPath::default(),
            severity: Severity::Error,
            annotation: annotation.to_string(),
            properties: vec![],
        }
    }

    fn find<'a>(properties: &'a [Property], key: &str) -> &'a Property {
        properties.iter().find(|p| p.key == key).unwrap()
    }

    #[test]
    fn parse_properties_when_no_behavior_then_default_edge_alarm() {
        let properties = parse_properties(&alarm("Code=1001"));

        let behavior = find(&properties, "Behavior");
        assert_eq!("EdgeAlarm", behavior.value);
        assert!(behavior.valid);
        assert_eq!(Some(XmlTag::Selector), behavior.tag);
    }

    #[test]
    fn parse_properties_when_no_pairs_then_only_default_behavior() {
        let properties = parse_properties(&alarm("Motor overload"));

        assert_eq!(1, properties.len());
        assert_eq!("Behavior", properties[0].key);
    }

    #[test]
    fn parse_properties_when_behavior_given_then_not_replaced() {
        let properties = parse_properties(&alarm("Behavior=PersistentAlarm"));

        assert_eq!(1, properties.len());
        assert_eq!("PersistentAlarm", properties[0].value);
    }

    #[test]
    fn parse_properties_when_keys_then_sorted() {
        let properties = parse_properties(&alarm("Severity=2 Code=7 Behavior.Retain=true"));

        let keys: Vec<&str> = properties.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(vec!["Behavior", "Behavior.Retain", "Code", "Severity"], keys);
    }

    #[test]
    fn parse_properties_when_boolean_lower_case_then_upper_case_and_valid() {
        let properties = parse_properties(&alarm("Behavior.Retain=true"));

        let retain = find(&properties, "Behavior.Retain");
        assert_eq!("TRUE", retain.value);
        assert!(retain.valid);
        assert_eq!(Some("Retain"), retain.id);
    }

    #[test]
    fn parse_properties_when_boolean_invalid_then_invalid() {
        let properties = parse_properties(&alarm("Behavior.Retain=maybe Code=3"));

        assert!(!find(&properties, "Behavior.Retain").valid);
        assert!(find(&properties, "Code").valid);
    }

    #[test]
    fn parse_properties_when_unknown_key_then_invalid_without_tag() {
        let properties = parse_properties(&alarm("Colour=red"));

        let colour = find(&properties, "Colour");
        assert!(!colour.valid);
        assert_eq!(None, colour.tag);
        assert_eq!(None, colour.id);
    }

    #[test]
    fn parse_properties_when_duplicate_key_then_first_wins() {
        let properties = parse_properties(&alarm("Code=1 Code=2"));

        assert_eq!(2, properties.len());
        assert_eq!("1", find(&properties, "Code").value);
    }

    #[test]
    fn parse_properties_when_code_not_number_then_invalid() {
        let properties = parse_properties(&alarm("Code=abc Behavior.Acknowledge=4"));

        assert!(!find(&properties, "Code").valid);
        assert!(!find(&properties, "Behavior.Acknowledge").valid);
    }

    #[rstest]
    #[case(ValidityRule::IntegerRange { low: 0, high: 3 }, "3", Ok(true))]
    #[case(ValidityRule::IntegerRange { low: 0, high: 3 }, "-1", Ok(false))]
    #[case(ValidityRule::IntegerRange { low: 0, high: 3 }, "1.5", Err("an integer"))]
    #[case(ValidityRule::RealRange { low: 0.0, high: 1.0 }, "0.5", Ok(true))]
    #[case(ValidityRule::RealRange { low: 0.0, high: 1.0 }, "x", Err("a real number"))]
    #[case(ValidityRule::OneOf(&["EdgeAlarm", "PersistentAlarm"]), "edgealarm", Ok(false))]
    #[case(ValidityRule::Boolean, "FALSE", Ok(true))]
    #[case(ValidityRule::Unconstrained, "anything at all", Ok(true))]
    fn check_when_value_then_result(
        #[case] rule: ValidityRule,
        #[case] value: &str,
        #[case] expected: Result<bool, &'static str>,
    ) {
        assert_eq!(expected, check(&rule, value));
    }
}
