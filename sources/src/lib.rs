//! Source file handling for alarmgen.
//!
//! - **FileType**: the kinds of files in an Automation Studio project
//! - **Source**: the text of one file together with the encoding it was
//!   read with, so that a rewritten file keeps its encoding
//! - **ProjectLayout**: the `Logical` and `Physical` directories of a
//!   project and the rules for finding files in them
//! - **SourceProject**: the global declaration files of a project

// Allow large errors because diagnostics carry labels and context.
#![allow(clippy::result_large_err)]

pub mod discovery;
pub mod file_type;
pub mod project;
pub mod source;

pub use discovery::ProjectLayout;
pub use file_type::FileType;
pub use project::SourceProject;
pub use source::Source;
