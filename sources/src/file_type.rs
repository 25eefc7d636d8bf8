//! File type detection and classification

use std::path::Path;

/// The type of a file in the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Variable declarations (.var)
    Variables,
    /// Type declarations (.typ)
    Types,
    /// Structured Text program (.st)
    StructuredText,
    /// C program (.c)
    C,
    /// Translation memory (.tmx)
    TranslationMemory,
    /// Alarm configuration (.mpalarmxcore)
    AlarmConfiguration,
    /// Package description (.pkg)
    Package,
    Unknown,
}

impl FileType {
    /// Determines the file type based on the file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("var") => FileType::Variables,
            Some(ext) if ext.eq_ignore_ascii_case("typ") => FileType::Types,
            Some(ext) if ext.eq_ignore_ascii_case("st") => FileType::StructuredText,
            Some(ext) if ext.eq_ignore_ascii_case("c") => FileType::C,
            Some(ext) if ext.eq_ignore_ascii_case("tmx") => FileType::TranslationMemory,
            Some(ext) if ext.eq_ignore_ascii_case("mpalarmxcore") => FileType::AlarmConfiguration,
            Some(ext) if ext.eq_ignore_ascii_case("pkg") => FileType::Package,
            _ => FileType::Unknown,
        }
    }

    /// Returns true if the file holds declarations that the parser reads
    pub fn is_declaration(&self) -> bool {
        matches!(self, FileType::Variables | FileType::Types)
    }

    /// Returns the file extension for this file type
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Variables => "var",
            FileType::Types => "typ",
            FileType::StructuredText => "st",
            FileType::C => "c",
            FileType::TranslationMemory => "tmx",
            FileType::AlarmConfiguration => "mpalarmxcore",
            FileType::Package => "pkg",
            FileType::Unknown => "",
        }
    }
}
