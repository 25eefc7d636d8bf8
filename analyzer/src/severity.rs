//! Classifies alarm structures by the name of their type.
use alarmgen_dsl::model::Severity;
use log::warn;

/// Returns every severity whose marker is in the type name, in precedence
/// order.
pub fn matches(type_name: &str) -> Vec<Severity> {
    Severity::ALL
        .into_iter()
        .filter(|severity| type_name.contains(severity.marker()))
        .collect()
}

/// Returns true if the type name marks a structure that holds alarms.
pub fn is_alarm_type(type_name: &str) -> bool {
    Severity::ALL
        .iter()
        .any(|severity| type_name.contains(severity.marker()))
}

/// Returns the severity for alarms in the type. When the name contains
/// more than one marker, the first in precedence order wins.
pub fn classify(type_name: &str) -> Option<Severity> {
    let found = matches(type_name);
    if found.len() > 1 {
        warn!(
            "Type {} matches severities {}; using {}",
            type_name,
            found
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            found[0]
        );
    }
    found.first().copied()
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::model::Severity;
    use rstest::rstest;

    use super::{classify, is_alarm_type};

    #[rstest]
    #[case("MotorErrorType", Some(Severity::Error))]
    #[case("MotorWarningType", Some(Severity::Warning))]
    #[case("LineInfoType", Some(Severity::Info))]
    #[case("InfoWarningType", Some(Severity::Warning))]
    #[case("ErrorInfoType", Some(Severity::Error))]
    #[case("MotorType", None)]
    #[case("motorerrortype", None)]
    fn classify_when_type_name_then_severity(
        #[case] type_name: &str,
        #[case] expected: Option<Severity>,
    ) {
        assert_eq!(expected, classify(type_name));
        assert_eq!(expected.is_some(), is_alarm_type(type_name));
    }
}
