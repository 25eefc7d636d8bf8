//! Project discovery
//!
//! An Automation Studio project has a `Logical` directory with the
//! programs and declarations and a `Physical` directory with one
//! subdirectory per hardware configuration.
//!
//! The global declaration files are the `.var` and `.typ` files under
//! `Logical` except for:
//!
//! - files in a `Libraries` directory
//! - files in a directory without a `Package.pkg`
//! - files that the `Package.pkg` marks as private
//!
//! Every list of files is sorted so that the results do not depend on the
//! order the file system returns entries in.

use std::path::{Path, PathBuf};

use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_problems::Problem;
use log::{debug, info, trace};
use walkdir::WalkDir;

use crate::file_type::FileType;
use crate::source::{diagnostic, Source};

pub const LOGICAL_DIR: &str = "Logical";
pub const PHYSICAL_DIR: &str = "Physical";
pub const PACKAGE_FILE: &str = "Package.pkg";
const LIBRARIES_DIR: &str = "Libraries";

/// The directories of a discovered project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// The root directory of the project
    pub root_dir: PathBuf,
    pub logical_dir: PathBuf,
    pub physical_dir: PathBuf,
}

/// Discover the project structure in a directory.
///
/// Returns an error if the directory does not exist or does not have the
/// `Logical` and `Physical` directories.
pub fn discover(dir: &Path) -> Result<ProjectLayout, Diagnostic> {
    info!("Discovering project structure in: {}", dir.display());

    if !dir.is_dir() {
        return Err(Diagnostic::problem(
            Problem::CannotReadDirectory,
            Label::file(
                FileId::from_path(dir),
                format!(
                    "Directory does not exist or is not a directory: {}",
                    dir.display()
                ),
            ),
        ));
    }

    let layout = ProjectLayout {
        root_dir: dir.to_path_buf(),
        logical_dir: dir.join(LOGICAL_DIR),
        physical_dir: dir.join(PHYSICAL_DIR),
    };

    for required in [&layout.logical_dir, &layout.physical_dir] {
        if !required.is_dir() {
            return Err(Diagnostic::problem(
                Problem::ProjectStructureInvalid,
                Label::file(
                    FileId::from_path(dir),
                    format!("Directory {} does not exist", required.display()),
                ),
            ));
        }
    }

    Ok(layout)
}

impl ProjectLayout {
    /// Returns the global `.var` and `.typ` files.
    pub fn declaration_files(&self) -> Result<Vec<PathBuf>, Diagnostic> {
        let mut files = vec![];
        for file_type in [FileType::Variables, FileType::Types] {
            let candidates = find_files_by_type(&self.logical_dir, file_type);
            if candidates.is_empty() {
                return Err(diagnostic(
                    Problem::FileNotFound,
                    &self.logical_dir,
                    format!("No .{} files in the project", file_type.extension()),
                ));
            }
            for path in candidates {
                if self.is_global(&path)? {
                    files.push(path);
                }
            }
        }
        files.sort();
        debug!("Found {} global declaration files", files.len());
        Ok(files)
    }

    /// Returns true if the declaration file is visible to the whole project.
    fn is_global(&self, path: &Path) -> Result<bool, Diagnostic> {
        let relative = path.strip_prefix(&self.logical_dir).unwrap_or(path);
        if relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().contains(LIBRARIES_DIR))
        {
            trace!("Skipping library file {}", path.display());
            return Ok(false);
        }

        let Some(dir) = path.parent() else {
            return Ok(false);
        };
        let package = dir.join(PACKAGE_FILE);
        if !package.is_file() {
            trace!("Skipping {} because it is not in a package", path.display());
            return Ok(false);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if is_private(&package, &file_name)? {
            trace!("Skipping private file {}", path.display());
            return Ok(false);
        }
        Ok(true)
    }

    /// Finds the first file with the name under `Logical`.
    pub fn find_logical_file(&self, file_name: &str) -> Option<PathBuf> {
        find_file(&self.logical_dir, file_name)
    }

    /// Finds the first file with the name under `Logical` or returns an
    /// error if there is none.
    pub fn require_logical_file(&self, file_name: &str) -> Result<PathBuf, Diagnostic> {
        self.find_logical_file(file_name)
            .ok_or_else(|| not_found(&self.logical_dir, file_name))
    }

    /// Finds the configuration file with the name. The search is limited
    /// to the configuration directory when a configuration is given.
    pub fn require_config_file(
        &self,
        configuration: &str,
        file_name: &str,
    ) -> Result<PathBuf, Diagnostic> {
        let dir = if configuration.is_empty() {
            self.physical_dir.clone()
        } else {
            self.physical_dir.join(configuration)
        };
        if !dir.is_dir() {
            return Err(Diagnostic::problem(
                Problem::CannotReadDirectory,
                Label::file(
                    FileId::from_path(&dir),
                    format!("Configuration directory {} does not exist", dir.display()),
                ),
            ));
        }
        find_file(&dir, file_name).ok_or_else(|| not_found(&dir, file_name))
    }

    /// Returns the name of the configuration that holds the file, that is
    /// the first directory under `Physical` on its path.
    pub fn configuration_of(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.physical_dir)
            .ok()?
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
    }

    /// Returns the names of the configurations in the project.
    pub fn configurations(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.physical_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Finds the first file with the name in the directory or below. The
/// directory is walked in sorted order, files before subdirectories.
pub fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by(|a, b| {
            let a_dir = a.file_type().is_dir();
            let b_dir = b.file_type().is_dir();
            a_dir
                .cmp(&b_dir)
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path())
}

fn find_files_by_type(dir: &Path, file_type: FileType) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file() && FileType::from_path(entry.path()) == file_type
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Returns true if the package marks the file as private.
fn is_private(package: &Path, file_name: &str) -> Result<bool, Diagnostic> {
    let source = Source::try_from_path(package)?;
    let doc = roxmltree::Document::parse(source.as_string()).map_err(|e| {
        Diagnostic::problem(
            Problem::XmlMalformed,
            Label::file(
                FileId::from_path(package),
                format!("Malformed package XML: {e}"),
            ),
        )
    })?;

    Ok(doc.descendants().any(|node| {
        node.is_element()
            && node.tag_name().name() == "Object"
            && node.text().map(str::trim) == Some(file_name)
            && node.attribute("Private") == Some("true")
    }))
}

fn not_found(dir: &Path, file_name: &str) -> Diagnostic {
    Diagnostic::problem(
        Problem::FileNotFound,
        Label::file(
            FileId::from_path(dir),
            format!("File {} does not exist in {}", file_name, dir.display()),
        ),
    )
}
