//! Writes the alarm list into the alarm configuration file.
//!
//! The configuration file holds an `Element` of type `mpalarmxcore`. The
//! generated alarm list is the `Group` with the ID
//! `mapp.AlarmX.Core.Configuration` inside that element:
//!
//! ```text
//! <Group ID="mapp.AlarmX.Core.Configuration">
//!   <Group ID="[0]">
//!     <Property ID="Name" Value="gMachine.Errors.EmergencyStop"/>
//!     <Property ID="Message" Value="{$Alarms/gMachine.Errors.EmergencyStop}"/>
//!     <Property ID="Code" Value="1001"/>
//!   </Group>
//! </Group>
//! ```
//!
//! The old list is removed and the new list is added as the last child of
//! the element. Everything else in the file is kept as it is.
use std::io;

use alarmgen_analyzer::property_tree::{create_tree_from_properties, remove_invalid_properties};
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_dsl::model::Alarm;
use alarmgen_dsl::property::{NodeData, NodeId, PropertyTree};
use alarmgen_problems::Problem;
use log::{debug, info};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::edit::{apply_edits, extend_to_lines, indent_before, indent_unit, line_start, TextEdit};
use crate::names::alarm_names;
use crate::tmx::{element_depth, parse_xml};

pub const CONFIGURATION_GROUP: &str = "mapp.AlarmX.Core.Configuration";
const CORE_ELEMENT_TYPE: &str = "mpalarmxcore";

/// Returns the configuration with a freshly generated alarm list.
///
/// The message of each alarm refers to the text with the alarm name in
/// the namespace (the name of the translation memory).
pub fn update_alarm_config(
    text: &str,
    alarms: &[Alarm],
    namespace: &str,
    file_id: &FileId,
) -> Result<String, Diagnostic> {
    let document = parse_xml(text, file_id)?;

    let element = document
        .descendants()
        .find(|node| {
            node.has_tag_name("Element") && node.attribute("Type") == Some(CORE_ELEMENT_TYPE)
        })
        .ok_or_else(|| {
            Diagnostic::problem(
                Problem::AlarmConfigMissing,
                Label::file(
                    file_id.clone(),
                    "Add an Element with Type=\"mpalarmxcore\" to the configuration",
                ),
            )
        })?;

    let mut edits: Vec<TextEdit> = element
        .children()
        .filter(|node| {
            node.has_tag_name("Group") && node.attribute("ID") == Some(CONFIGURATION_GROUP)
        })
        .map(|group| TextEdit::delete(extend_to_lines(text, group.range())))
        .collect();
    debug!("Removing {} old alarm lists", edits.len());

    let range = element.range();
    let indent = indent_before(text, range.start).unwrap_or("");
    let unit = indent_unit(indent, element_depth(&element));
    let child_indent = format!("{}{}", indent, unit);

    let rendered = render_configuration(alarms, namespace, &unit).map_err(|err| {
        Diagnostic::problem(
            Problem::CannotWriteFile,
            Label::file(file_id.clone(), err.to_string()),
        )
    })?;
    let lines: String = rendered
        .lines()
        .map(|line| format!("{}{}\n", child_indent, line))
        .collect();

    let source = &text[range.clone()];
    if source.ends_with("/>") {
        let open = source.trim_end_matches("/>").trim_end();
        let expanded = format!("{}>\n{}{}</Element>", open, lines, indent);
        edits.push(TextEdit::replace(range, expanded));
    } else {
        let close = source
            .rfind("</")
            .map_or(range.end, |idx| range.start + idx);
        edits.push(match indent_before(text, close) {
            Some(_) => TextEdit::insert(line_start(text, close), lines),
            None => TextEdit::insert(close, format!("\n{}", lines)),
        });
    }

    info!("Configuration {} lists {} alarms", file_id, alarms.len());
    Ok(apply_edits(text, edits))
}

/// Renders the alarm list group. Nested elements are indented by the unit.
pub fn render_configuration(alarms: &[Alarm], namespace: &str, unit: &str) -> io::Result<String> {
    let (indent_char, indent_size) = match unit.as_bytes() {
        [b' ', ..] => (b' ', unit.len()),
        _ => (b'\t', 1),
    };
    let mut writer = Writer::new_with_indent(Vec::new(), indent_char, indent_size);

    let mut list = BytesStart::new("Group");
    list.push_attribute(("ID", CONFIGURATION_GROUP));
    writer.write_event(Event::Start(list))?;

    let mut index = 0;
    for alarm in alarms {
        let mut tree = create_tree_from_properties(&alarm.properties);
        remove_invalid_properties(&mut tree);

        for name in alarm_names(alarm) {
            let id = format!("[{}]", index);
            let mut group = BytesStart::new("Group");
            group.push_attribute(("ID", id.as_str()));
            writer.write_event(Event::Start(group))?;

            write_property(&mut writer, "Name", &name)?;
            write_property(&mut writer, "Message", &format!("{{${}/{}}}", namespace, name))?;
            write_nodes(&mut writer, &tree, PropertyTree::ROOT)?;

            writer.write_event(Event::End(BytesEnd::new("Group")))?;
            index += 1;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("Group")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

fn write_property(writer: &mut Writer<Vec<u8>>, id: &str, value: &str) -> io::Result<()> {
    let mut element = BytesStart::new("Property");
    element.push_attribute(("ID", id));
    element.push_attribute(("Value", value));
    writer.write_event(Event::Empty(element))
}

fn write_nodes(
    writer: &mut Writer<Vec<u8>>,
    tree: &PropertyTree,
    parent: NodeId,
) -> io::Result<()> {
    for child in tree.children(parent) {
        let node = tree.node(*child);
        let (tag, id, value) = match &node.data {
            NodeData::Property(property) => {
                let (Some(tag), Some(id)) = (property.tag, property.id) else {
                    continue;
                };
                (tag, id, Some(property.value.as_str()))
            }
            NodeData::Schema(entry) => (entry.tag, entry.id, None),
            NodeData::Root | NodeData::Unknown => continue,
        };

        let mut element = BytesStart::new(tag.as_str());
        element.push_attribute(("ID", id));
        if let Some(value) = value {
            element.push_attribute(("Value", value));
        }

        if tree.children(*child).is_empty() {
            writer.write_event(Event::Empty(element))?;
        } else {
            writer.write_event(Event::Start(element))?;
            write_nodes(writer, tree, *child)?;
            writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        }
    }
    Ok(())
}
