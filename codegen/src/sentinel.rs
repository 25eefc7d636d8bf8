//! The markers around the generated part of a file.
//!
//! Everything between the line with [`START_MARKER`] and the line with
//! [`END_MARKER`] belongs to the generator and is replaced on every run.
//! The marker lines and the text outside the region are kept.
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_problems::Problem;

pub const START_MARKER: &str = "// START OF AUTOMATIC CODE GENERATION //";
pub const END_MARKER: &str = "// END OF AUTOMATIC CODE GENERATION //";

/// Replaces the generated region of the text with the body. Only the first
/// region is replaced.
pub fn replace_region(text: &str, body: &str, file_id: &FileId) -> Result<String, Diagnostic> {
    let start = text.find(START_MARKER).ok_or_else(|| {
        Diagnostic::problem(
            Problem::MarkerStartMissing,
            Label::file(
                file_id.clone(),
                format!("Insert the comment {} into the file", START_MARKER),
            ),
        )
    })?;

    let end_missing = || {
        Diagnostic::problem(
            Problem::MarkerEndMissing,
            Label::offset(
                file_id.clone(),
                start..start + START_MARKER.len(),
                format!("Insert the comment {} after this line", END_MARKER),
            ),
        )
    };

    let region_start = text[start..]
        .find('\n')
        .map(|idx| start + idx + 1)
        .ok_or_else(end_missing)?;
    let end = text[region_start..]
        .find(END_MARKER)
        .map(|idx| region_start + idx)
        .ok_or_else(end_missing)?;
    let region_end = text[..end].rfind('\n').map_or(0, |idx| idx + 1);

    let mut result = String::with_capacity(text.len() + body.len());
    result.push_str(&text[..region_start]);
    result.push_str(body);
    result.push_str(&text[region_end..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::core::FileId;

    use super::replace_region;

    fn file_id() -> FileId {
        FileId::from_string("Alarms.st")
    }

    #[test]
    fn replace_region_when_markers_then_only_region_replaced() {
        let text = "PROGRAM _CYCLIC\n\t// START OF AUTOMATIC CODE GENERATION //\n\told\n\t// END OF AUTOMATIC CODE GENERATION //\nEND_PROGRAM\n";

        let result = replace_region(text, "\tnew\n", &file_id()).unwrap();

        assert_eq!(
            "PROGRAM _CYCLIC\n\t// START OF AUTOMATIC CODE GENERATION //\n\tnew\n\t// END OF AUTOMATIC CODE GENERATION //\nEND_PROGRAM\n",
            result
        );
    }

    #[test]
    fn replace_region_when_applied_twice_then_same_text() {
        let text =
            "// START OF AUTOMATIC CODE GENERATION //\n// END OF AUTOMATIC CODE GENERATION //\n";

        let once = replace_region(text, "body\n", &file_id()).unwrap();
        let twice = replace_region(&once, "body\n", &file_id()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn replace_region_when_start_missing_then_err() {
        let text = "// END OF AUTOMATIC CODE GENERATION //\n";

        let err = replace_region(text, "body", &file_id()).unwrap_err();

        assert_eq!("P0204", err.code);
    }

    #[test]
    fn replace_region_when_end_missing_then_err() {
        let text = "// START OF AUTOMATIC CODE GENERATION //\nbody\n";

        let err = replace_region(text, "body", &file_id()).unwrap_err();

        assert_eq!("P0205", err.code);
    }

    #[test]
    fn replace_region_when_end_before_start_then_err() {
        let text =
            "// END OF AUTOMATIC CODE GENERATION //\n// START OF AUTOMATIC CODE GENERATION //\n";

        let err = replace_region(text, "body", &file_id()).unwrap_err();

        assert_eq!("P0205", err.code);
    }
}
