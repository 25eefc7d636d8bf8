//! Source file abstraction with encoding detection

use std::path::{Path, PathBuf};

use alarmgen_dsl::{
    core::FileId,
    declaration::DeclarationSet,
    diagnostic::{Diagnostic, Label},
};
use alarmgen_parser::parse_declarations;
use alarmgen_problems::Problem;
use encoding_rs::Encoding;
use log::{debug, trace};

use crate::file_type::FileType;

const UTF_8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// The contents of a file and the encoding used to read it
#[derive(Debug, Clone)]
pub struct Source {
    file_id: FileId,
    path: PathBuf,
    data: String,
    file_type: FileType,
    encoding: &'static Encoding,
    bom: bool,
}

impl Source {
    /// Create a new UTF-8 Source from content and file ID
    pub fn new(source: String, file_id: &FileId) -> Self {
        let path: PathBuf = file_id.to_string().into();
        let file_type = FileType::from_path(&path);

        Self {
            file_id: file_id.clone(),
            path,
            data: source,
            file_type,
            encoding: encoding_rs::UTF_8,
            bom: false,
        }
    }

    /// Create a Source by reading from a file
    pub fn try_from_path(path: &Path) -> Result<Source, Diagnostic> {
        let bytes = read_file_bytes(path)?;
        let (data, encoding) = decode(path, &bytes)?;
        Ok(Source {
            file_id: FileId::from_path(path),
            path: path.to_path_buf(),
            data,
            file_type: FileType::from_path(path),
            encoding,
            bom: bytes.starts_with(UTF_8_BOM),
        })
    }

    /// Get the text content
    pub fn as_string(&self) -> &str {
        &self.data
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The encoding the file was read with
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Extracts the declarations if this is a declaration file. Other
    /// files have no declarations.
    pub fn declarations(&self) -> DeclarationSet {
        if !self.file_type.is_declaration() {
            trace!("File {} is not a declaration file", self.file_id);
            return DeclarationSet::new();
        }
        parse_declarations(&self.data, &self.file_id)
    }

    /// Encodes text for this file with the encoding the file was read
    /// with. Fails if the text has characters the encoding cannot hold.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, Diagnostic> {
        let (bytes, encoding_used, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(diagnostic(
                Problem::UnsupportedEncoding,
                &self.path,
                format!(
                    "The new content cannot be written as {}",
                    encoding_used.name()
                ),
            ));
        }
        let mut result = Vec::with_capacity(bytes.len() + UTF_8_BOM.len());
        if self.bom {
            result.extend_from_slice(UTF_8_BOM);
        }
        result.extend_from_slice(&bytes);
        Ok(result)
    }
}

fn read_file_bytes(path: &Path) -> Result<Vec<u8>, Diagnostic> {
    debug!("Reading file {}", path.display());

    if !path.is_file() {
        return Err(diagnostic(
            Problem::FileNotFound,
            path,
            format!("File {} does not exist", path.display()),
        ));
    }

    std::fs::read(path).map_err(|e| diagnostic(Problem::CannotReadFile, path, e.to_string()))
}

/// Decodes with the first encoding that matches.
fn decode(path: &Path, bytes: &[u8]) -> Result<(String, &'static Encoding), Diagnostic> {
    let decoders: [&'static Encoding; 2] = [encoding_rs::UTF_8, encoding_rs::WINDOWS_1252];

    let result = decoders.into_iter().find_map(|d| {
        let (res, encoding_used, had_errors) = d.decode(bytes);
        if had_errors {
            trace!(
                "Path {} did not match encoding {}",
                path.display(),
                encoding_used.name()
            );
            return None;
        }
        trace!(
            "Path {} matched encoding {}",
            path.display(),
            encoding_used.name()
        );
        Some((res.to_string(), encoding_used))
    });

    result.ok_or_else(|| {
        diagnostic(
            Problem::UnsupportedEncoding,
            path,
            String::from("The file is not UTF-8 or Windows-1252"),
        )
    })
}

/// Writes the bytes to the file, replacing the content.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Diagnostic> {
    debug!("Writing file {}", path.display());
    std::fs::write(path, bytes)
        .map_err(|e| diagnostic(Problem::CannotWriteFile, path, e.to_string()))
}

pub fn diagnostic(problem: Problem, path: &Path, message: String) -> Diagnostic {
    Diagnostic::problem(problem, Label::file(FileId::from_path(path), message))
}
