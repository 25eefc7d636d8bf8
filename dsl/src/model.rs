//! The resolved alarm model.
//!
//! Objects in this module have concrete array bounds (constants are already
//! folded). They are produced by the analyzer and consumed by the artifact
//! generators.
use core::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::core::SourceSpan;
use crate::property::Property;

/// Resolved bounds of a one-dimensional array. Both ends are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ArrayBounds {
    pub low: i64,
    pub high: i64,
}

impl ArrayBounds {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    /// Every index in the array in ascending order.
    pub fn indices(&self) -> RangeInclusive<i64> {
        self.low..=self.high
    }
}

impl fmt::Display for ArrayBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.low, self.high)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlobalVariable {
    pub name: String,
    pub type_name: String,
    pub bounds: Option<ArrayBounds>,
    pub span: SourceSpan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub name: String,
    pub type_name: String,
    pub value: i64,
}

/// A member of a structure type with resolved bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordTypeMember {
    pub name: String,
    pub type_name: String,
    pub bounds: Option<ArrayBounds>,
    pub annotation: String,
    pub parent_type: String,
    pub span: SourceSpan,
}

impl RecordTypeMember {
    /// Returns true if the member is identical to other ignoring where it was
    /// declared. The same structure declared in two files yields identical members.
    pub fn same_declaration(&self, other: &RecordTypeMember) -> bool {
        self.name == other.name
            && self.type_name == other.type_name
            && self.bounds == other.bounds
            && self.annotation == other.annotation
            && self.parent_type == other.parent_type
    }
}

/// One step on the way from a global variable to an alarm.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PathSegment {
    pub name: String,
    pub type_name: String,
    pub bounds: Option<ArrayBounds>,
    /// The structure type that contains this segment. The first segment is a
    /// global variable and has no parent type.
    pub parent_type: Option<String>,
}

impl PathSegment {
    pub fn from_variable(variable: &GlobalVariable) -> Self {
        Self {
            name: variable.name.clone(),
            type_name: variable.type_name.clone(),
            bounds: variable.bounds,
            parent_type: None,
        }
    }

    pub fn from_member(member: &RecordTypeMember) -> Self {
        Self {
            name: member.name.clone(),
            type_name: member.type_name.clone(),
            bounds: member.bounds,
            parent_type: Some(member.parent_type.clone()),
        }
    }
}

/// The chain of containment from a global variable (first segment) to the
/// structure that directly holds alarm booleans (last segment).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AlarmPath {
    pub segments: Vec<PathSegment>,
}

impl AlarmPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn root(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for AlarmPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{}", segment.name)?;
            if let Some(bounds) = segment.bounds {
                write!(f, "{}", bounds)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Severities in the order they are checked and emitted.
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    /// The substring in a structure type name that marks the severity.
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    /// The title of the group of alarms with this severity.
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Error => "Errors",
            Severity::Warning => "Warnings",
            Severity::Info => "Infos",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// A boolean alarm flag reachable from a global variable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alarm {
    /// Name of the boolean member.
    pub variable_name: String,
    pub bounds: Option<ArrayBounds>,
    pub path: AlarmPath,
    pub severity: Severity,
    /// The annotation after acknowledgment keywords are normalized.
    pub annotation: String,
    pub properties: Vec<Property>,
}

impl Alarm {
    /// Returns the property with the key, if the alarm has the property.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.path, self.variable_name)?;
        if let Some(bounds) = self.bounds {
            write!(f, "{}", bounds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(name: &str, bounds: Option<ArrayBounds>) -> PathSegment {
        PathSegment {
            name: name.to_string(),
            type_name: format!("{}Type", name),
            bounds,
            parent_type: None,
        }
    }

    #[test]
    fn display_when_alarm_with_arrays_then_shows_bounds() {
        let alarm = Alarm {
            variable_name: String::from("Overload"),
            bounds: Some(ArrayBounds::new(1, 2)),
            path: AlarmPath::new(vec![
                segment("gMachine", None),
                segment("Axes", Some(ArrayBounds::new(1, 3))),
            ]),
            severity: Severity::Error,
            annotation: String::new(),
            properties: vec![],
        };

        assert_eq!("gMachine > Axes[1..3] > Overload[1..2]", alarm.to_string());
    }

    #[test]
    fn serialize_when_path_then_transparent_array() {
        let path = AlarmPath::new(vec![segment("gMachine", None)]);

        let json = serde_json::to_value(&path).unwrap();

        assert!(json.is_array());
        assert_eq!("gMachine", json[0]["name"]);
    }
}
