//! The properties an alarm annotation may set.
//!
//! Keys are the dotted names written in annotations. The entry gives the
//! element used in the alarm configuration and the values that are
//! accepted.
use alarmgen_dsl::property::{SchemaEntry, ValidityRule, XmlTag};
use phf::{phf_map, Map};

/// The behavior an alarm has when the annotation does not set one.
pub const DEFAULT_BEHAVIOR: &str = "EdgeAlarm";

pub const BEHAVIOR_KEY: &str = "Behavior";

const UDINT: ValidityRule = ValidityRule::IntegerRange {
    low: 0,
    high: 4_294_967_295,
};

pub static PROPERTY_SCHEMA: Map<&'static str, SchemaEntry> = phf_map! {
    "Code" => SchemaEntry { tag: XmlTag::Property, id: "Code", rule: UDINT },
    "Severity" => SchemaEntry { tag: XmlTag::Property, id: "Severity", rule: UDINT },
    "Behavior" => SchemaEntry {
        tag: XmlTag::Selector,
        id: "Behavior",
        rule: ValidityRule::OneOf(&["EdgeAlarm", "PersistentAlarm", "UserDefined"]),
    },
    "Behavior.AutoReset" => SchemaEntry { tag: XmlTag::Property, id: "AutoReset", rule: ValidityRule::Boolean },
    "Behavior.Acknowledge" => SchemaEntry {
        tag: XmlTag::Property,
        id: "Acknowledge",
        rule: ValidityRule::IntegerRange { low: 0, high: 3 },
    },
    "Behavior.MultipleInstances" => SchemaEntry { tag: XmlTag::Property, id: "MultipleInstances", rule: ValidityRule::Boolean },
    "Behavior.ReactionUntilAcknowledged" => SchemaEntry { tag: XmlTag::Property, id: "ReactionUntilAcknowledged", rule: ValidityRule::Boolean },
    "Behavior.Retain" => SchemaEntry { tag: XmlTag::Property, id: "Retain", rule: ValidityRule::Boolean },
    "Behavior.Asynchronous" => SchemaEntry { tag: XmlTag::Property, id: "Async", rule: ValidityRule::Boolean },
    "Behavior.DataUpdate" => SchemaEntry { tag: XmlTag::Group, id: "DataUpdate", rule: ValidityRule::Unconstrained },
    "Behavior.DataUpdate.Activation" => SchemaEntry { tag: XmlTag::Group, id: "Activation", rule: ValidityRule::Unconstrained },
    "Behavior.DataUpdate.Activation.Timestamp" => SchemaEntry { tag: XmlTag::Property, id: "TimeStamp", rule: ValidityRule::Boolean },
    "Behavior.DataUpdate.Activation.Snippets" => SchemaEntry { tag: XmlTag::Property, id: "Snippets", rule: ValidityRule::Boolean },
    "Behavior.HistoryReport" => SchemaEntry { tag: XmlTag::Group, id: "Recording", rule: ValidityRule::Unconstrained },
    "Behavior.HistoryReport.InactiveToActive" => SchemaEntry { tag: XmlTag::Property, id: "InactiveToActive", rule: ValidityRule::Boolean },
    "Behavior.HistoryReport.ActiveToInactive" => SchemaEntry { tag: XmlTag::Property, id: "ActiveToInactive", rule: ValidityRule::Boolean },
    "Behavior.HistoryReport.UnacknowledgedToAcknowledged" => SchemaEntry { tag: XmlTag::Property, id: "UnacknowledgedToAcknowledged", rule: ValidityRule::Boolean },
    "Behavior.HistoryReport.AcknowledgedToUnacknowledged" => SchemaEntry { tag: XmlTag::Property, id: "AcknowledgedToUnacknowledged", rule: ValidityRule::Boolean },
    "Behavior.HistoryReport.Update" => SchemaEntry { tag: XmlTag::Property, id: "Update", rule: ValidityRule::Boolean },
    "Disable" => SchemaEntry { tag: XmlTag::Property, id: "Disable", rule: ValidityRule::Boolean },
    "AdditionalInformation1" => SchemaEntry { tag: XmlTag::Property, id: "AdditionalInformation1", rule: ValidityRule::Unconstrained },
    "AdditionalInformation2" => SchemaEntry { tag: XmlTag::Property, id: "AdditionalInformation2", rule: ValidityRule::Unconstrained },
};

pub fn lookup(key: &str) -> Option<&'static SchemaEntry> {
    PROPERTY_SCHEMA.get(key)
}
