//! Edits that change parts of a file and keep every other byte.
use std::ops::Range;

/// Replaces the bytes in the range with the replacement. An empty range
/// inserts the replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            replacement: String::new(),
        }
    }

    pub fn insert(at: usize, text: String) -> Self {
        Self {
            range: at..at,
            replacement: text,
        }
    }

    pub fn replace(range: Range<usize>, text: String) -> Self {
        Self {
            range,
            replacement: text,
        }
    }
}

/// Applies the edits in position order. The edits must not overlap.
pub fn apply_edits(text: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut result = String::with_capacity(text.len());
    let mut position = 0;
    for edit in edits {
        debug_assert!(edit.range.start >= position, "edits overlap");
        result.push_str(&text[position..edit.range.start]);
        result.push_str(&edit.replacement);
        position = edit.range.end;
    }
    result.push_str(&text[position..]);
    result
}

/// Returns the offset of the start of the line that holds the position.
pub fn line_start(text: &str, position: usize) -> usize {
    text[..position].rfind('\n').map_or(0, |idx| idx + 1)
}

/// Returns the text between the start of the line and the position if
/// the text is only whitespace.
pub fn indent_before(text: &str, position: usize) -> Option<&str> {
    let prefix = &text[line_start(text, position)..position];
    if prefix.chars().all(char::is_whitespace) {
        Some(prefix)
    } else {
        None
    }
}

/// Extends the range to whole lines (including the line break) when only
/// whitespace shares the lines with the range. Otherwise the range is
/// unchanged.
pub fn extend_to_lines(text: &str, range: Range<usize>) -> Range<usize> {
    let start = line_start(text, range.start);
    let end = text[range.end..]
        .find('\n')
        .map_or(text.len(), |idx| range.end + idx + 1);

    let before = &text[start..range.start];
    let after = &text[range.end..end];
    if before.trim().is_empty() && after.trim().is_empty() {
        start..end
    } else {
        range
    }
}

/// Guesses one level of indentation from the indentation of an element at
/// the depth. Spaces are kept when the file indents with spaces.
pub fn indent_unit(indent: &str, depth: usize) -> String {
    let spaces = !indent.is_empty() && indent.chars().all(|c| c == ' ');
    if spaces && depth > 0 && indent.len() % depth == 0 {
        return " ".repeat(indent.len() / depth);
    }
    String::from("\t")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn apply_edits_when_unordered_then_applied_in_position_order() {
        let text = "abcdef";

        let result = apply_edits(
            text,
            vec![
                TextEdit::insert(6, String::from("!")),
                TextEdit::delete(1..3),
                TextEdit::replace(4..5, String::from("E")),
            ],
        );

        assert_eq!("adEf!", result);
    }

    #[test]
    fn extend_to_lines_when_alone_on_line_then_whole_line() {
        let text = "<a>\n  <b />\n</a>\n";

        assert_eq!(4..12, extend_to_lines(text, 6..11));
    }

    #[test]
    fn extend_to_lines_when_shares_line_then_unchanged() {
        let text = "<a><b /></a>";

        assert_eq!(3..8, extend_to_lines(text, 3..8));
    }

    #[test]
    fn indent_before_when_text_before_then_none() {
        assert_eq!(None, indent_before("<a></a>", 3));
        assert_eq!(Some("\t"), indent_before("<a>\n\t</a>", 5));
    }

    #[rstest]
    #[case("  ", 1, "  ")]
    #[case("    ", 2, "  ")]
    #[case("\t", 1, "\t")]
    #[case("", 0, "\t")]
    #[case("   ", 2, "\t")]
    fn indent_unit_when_indent_then_unit(
        #[case] indent: &str,
        #[case] depth: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(expected, indent_unit(indent, depth));
    }
}
