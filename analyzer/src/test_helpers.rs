//! Helpers shared by the analyzer tests.
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::declaration::DeclarationSet;
use alarmgen_parser::parse_declarations;

#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parses declaration text as if it came from one file.
pub fn declarations(source: &str) -> DeclarationSet {
    parse_declarations(source, &FileId::from_string("test.typ"))
}

/// Parses several declaration texts and joins the results.
pub fn declarations_from(sources: &[&str]) -> DeclarationSet {
    let mut set = DeclarationSet::new();
    for (idx, source) in sources.iter().enumerate() {
        let file_id = FileId::from_string(&format!("test{}.typ", idx));
        set.extend(parse_declarations(source, &file_id));
    }
    set
}
