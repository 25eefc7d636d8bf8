//! Provides definition for diagnostics, which are the fatal errors
//! reported while generating alarms.
//!
//! Recoverable problems (such as an invalid property value) are not
//! diagnostics; they are logged as warnings and generation continues.

use std::ops::Range;

use alarmgen_problems::Problem;

use crate::core::{FileId, SourceSpan};

/// The position a label refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// The file as a whole rather than a particular position.
    File,
    /// Byte offsets in the file (0-indexed).
    OffsetRange(Range<usize>),
}

/// A label that refers to some range in a file and possibly associated
/// with a message related to that range.
#[derive(Debug, Clone)]
pub struct Label {
    /// The position of label.
    pub location: Location,

    /// Identifier for the file.
    pub file_id: FileId,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn offset(
        file_id: impl Into<FileId>,
        offset: impl Into<Range<usize>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: Location::OffsetRange(offset.into()),
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    pub fn span(span: &SourceSpan, message: impl Into<String>) -> Self {
        Self {
            location: Location::OffsetRange(span.as_range()),
            file_id: span.file_id.clone(),
            message: message.into(),
        }
    }

    /// A "position" that is a file in its entirety rather than a particular
    /// line number.
    pub fn file(file_id: impl Into<FileId>, message: impl Into<String>) -> Self {
        Self {
            location: Location::File,
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    /// A label that is not associated with any file.
    pub fn none(message: impl Into<String>) -> Self {
        Self::file(FileId::default(), message)
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a primary location and possibly non-zero set of secondary locations.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first label.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// This forms part of the main description and does not need to be
    /// related to a position in a source file.
    pub fn with_context(mut self, description: &str, item: impl std::fmt::Display) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns the description for the diagnostic including the context.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }

    /// Returns the identifiers of every file that a label refers to.
    pub fn file_ids(&self) -> Vec<&FileId> {
        let mut ids = vec![&self.primary.file_id];
        for label in &self.secondary {
            if !ids.contains(&&label.file_id) {
                ids.push(&label.file_id);
            }
        }
        ids
    }
}
