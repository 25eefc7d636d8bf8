//! Helpers shared by the generator tests.
use alarmgen_analyzer::stages::{analyze, AnalyzerOptions};
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::model::Alarm;
use alarmgen_parser::parse_declarations;
use alarmgen_test::read_shared_resource;

/// Returns the alarms declared in the text.
pub fn alarms(source: &str) -> Vec<Alarm> {
    let declarations = parse_declarations(source, &FileId::from_string("test.typ"));
    analyze(&declarations, &AnalyzerOptions::default())
        .unwrap()
        .alarms
}

/// Returns the alarms of the shared test project.
pub fn project_alarms() -> Vec<Alarm> {
    let mut declarations = parse_declarations(
        &read_shared_resource("project/Logical/Global.typ"),
        &FileId::from_string("Global.typ"),
    );
    declarations.extend(parse_declarations(
        &read_shared_resource("project/Logical/Global.var"),
        &FileId::from_string("Global.var"),
    ));
    analyze(&declarations, &AnalyzerOptions::default())
        .unwrap()
        .alarms
}
