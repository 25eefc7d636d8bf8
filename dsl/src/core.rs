//! Source locations for declarations and diagnostics.
use core::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// FileId identifies the file that a declaration or a diagnostic
/// refers to.
///
/// The identifier is normally the path of the file. An empty identifier
/// is used for text that does not come from a file (for example, in tests).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice
    /// is normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId(Arc::from(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&Path> for FileId {
    fn from(path: &Path) -> Self {
        FileId::from_path(path)
    }
}

/// Location in a file of a declaration.
///
/// The location is defined by byte offsets in the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSpan {
    /// The position of the starting character (0-indexed).
    pub start: usize,
    /// The position one past the ending character (0-indexed).
    pub end: usize,
    pub file_id: FileId,
}

impl SourceSpan {
    pub fn range(start: usize, end: usize, file_id: &FileId) -> Self {
        Self {
            start,
            end,
            file_id: file_id.clone(),
        }
    }

    /// Creates a span that covers from the start of `start` to the end of `end`.
    pub fn join(start: &SourceSpan, end: &SourceSpan) -> Self {
        Self {
            start: start.start,
            end: end.end,
            file_id: start.file_id.clone(),
        }
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_when_two_spans_then_covers_both() {
        let file_id = FileId::from_string("Global.var");
        let a = SourceSpan::range(4, 9, &file_id);
        let b = SourceSpan::range(12, 20, &file_id);

        let joined = SourceSpan::join(&a, &b);

        assert_eq!(4..20, joined.as_range());
        assert_eq!("Global.var", joined.file_id.as_str());
    }
}
