//! Synchronizes the translation units of the translation memory with the
//! alarm names.
//!
//! Translation units (`tu`) whose `tuid` is no longer an alarm name are
//! removed and a unit is added for every new alarm name. Units that are
//! kept are not touched so that their translations survive.
use std::collections::HashSet;

use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_problems::Problem;
use log::{debug, info};
use quick_xml::escape::escape;
use roxmltree::{Document, Node, ParsingOptions};

use crate::edit::{apply_edits, extend_to_lines, indent_before, indent_unit, line_start, TextEdit};

/// Returns the translation memory with the units for the names.
pub fn update_tmx(text: &str, names: &[String], file_id: &FileId) -> Result<String, Diagnostic> {
    let document = parse_xml(text, file_id)?;

    let body = document
        .descendants()
        .find(|node| node.has_tag_name("body"))
        .ok_or_else(|| {
            Diagnostic::problem(
                Problem::TmxBodyMissing,
                Label::file(file_id.clone(), "Add a body element to the tmx element"),
            )
        })?;

    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut existing: HashSet<&str> = HashSet::new();
    let mut edits = vec![];

    for unit in body.children().filter(|node| node.has_tag_name("tu")) {
        let Some(tuid) = unit.attribute("tuid") else {
            continue;
        };
        existing.insert(tuid);
        if !wanted.contains(tuid) {
            debug!("Removing translation unit {}", tuid);
            edits.push(TextEdit::delete(extend_to_lines(text, unit.range())));
        }
    }
    let removed = edits.len();

    let mut added: HashSet<&str> = HashSet::new();
    let new_names: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| !existing.contains(*name) && added.insert(*name))
        .collect();

    if !new_names.is_empty() {
        edits.push(insert_units(text, &body, &new_names));
    }

    info!(
        "Translation memory {}: {} units added, {} units removed",
        file_id,
        new_names.len(),
        removed
    );
    Ok(apply_edits(text, edits))
}

pub(crate) fn parse_xml<'a>(text: &'a str, file_id: &FileId) -> Result<Document<'a>, Diagnostic> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(|err| {
        let position = err.pos();
        Diagnostic::problem(
            Problem::XmlMalformed,
            Label::file(file_id.clone(), err.to_string()),
        )
        .with_context("line", position.row)
        .with_context("column", position.col)
    })
}

/// Returns the depth of the element below the document root element.
pub(crate) fn element_depth(node: &Node) -> usize {
    node.ancestors()
        .filter(|ancestor| ancestor.is_element())
        .count()
        .saturating_sub(1)
}

fn insert_units(text: &str, body: &Node, names: &[&str]) -> TextEdit {
    let range = body.range();
    let indent = indent_before(text, range.start).unwrap_or("");
    let unit_indent = format!("{}{}", indent, indent_unit(indent, element_depth(body)));

    let lines: String = names
        .iter()
        .map(|name| format!("{}<tu tuid=\"{}\" />\n", unit_indent, escape(*name)))
        .collect();

    let element = &text[range.clone()];
    if element.ends_with("/>") {
        // <body /> has no closing tag to insert before
        let open = element.trim_end_matches("/>").trim_end();
        return TextEdit::replace(range, format!("{}>\n{}{}</body>", open, lines, indent));
    }

    let close = element
        .rfind("</")
        .map_or(range.end, |idx| range.start + idx);
    match indent_before(text, close) {
        Some(_) => TextEdit::insert(line_start(text, close), lines),
        None => TextEdit::insert(close, format!("\n{}", lines)),
    }
}
