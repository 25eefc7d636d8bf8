//! The global declaration files of a project

use std::path::{Path, PathBuf};

use alarmgen_dsl::{declaration::DeclarationSet, diagnostic::Diagnostic};
use log::{info, trace};

use crate::discovery;
use crate::source::Source;

/// The declaration files of a project in the order they were found
#[derive(Debug, Default)]
pub struct SourceProject {
    sources: Vec<Source>,
}

impl SourceProject {
    pub fn new() -> Self {
        Self { sources: vec![] }
    }

    /// Add a source file to the project by path
    pub fn add_file(&mut self, path: &Path) -> Result<(), Diagnostic> {
        let source = Source::try_from_path(path)?;
        trace!("Adding source file: {}", source.file_id());
        self.sources.push(source);
        Ok(())
    }

    /// Add source content directly to the project
    pub fn add_source(&mut self, source: Source) {
        trace!("Adding source file: {}", source.file_id());
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Initialize the project with the global declaration files of the
    /// project in the directory.
    pub fn initialize_from_directory(&mut self, dir: &Path) -> Result<(), Vec<Diagnostic>> {
        info!("Initializing project from directory: {}", dir.display());

        self.sources.clear();

        let layout = discovery::discover(dir).map_err(|err| vec![err])?;
        let files = layout.declaration_files().map_err(|err| vec![err])?;
        self.add_files(&files)
    }

    /// Adds every file and reports every file that cannot be read.
    pub fn add_files(&mut self, files: &[PathBuf]) -> Result<(), Vec<Diagnostic>> {
        let errors: Vec<Diagnostic> = files
            .iter()
            .filter_map(|path| self.add_file(path).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns the declarations of every file joined in file order.
    pub fn declarations(&self) -> DeclarationSet {
        let mut declarations = DeclarationSet::new();
        for source in &self.sources {
            declarations.extend(source.declarations());
        }
        declarations
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarmgen_dsl::core::FileId;
    use alarmgen_test::shared_resource_path;

    #[test]
    fn new_when_created_then_empty() {
        let project = SourceProject::new();
        assert!(project.is_empty());
        assert_eq!(0, project.len());
    }

    #[test]
    fn declarations_when_two_sources_then_joined() {
        let mut project = SourceProject::new();
        project.add_source(Source::new(
            String::from("TYPE\n\tAType : STRUCT\n\t\tX : INT;\n\tEND_STRUCT;\nEND_TYPE"),
            &FileId::from_string("A.typ"),
        ));
        project.add_source(Source::new(
            String::from("VAR\n\tgA : AType;\nEND_VAR"),
            &FileId::from_string("A.var"),
        ));

        let declarations = project.declarations();

        assert_eq!(1, declarations.members.len());
        assert_eq!(1, declarations.variables.len());
    }

    #[test]
    fn initialize_from_directory_when_project_then_global_files() {
        let mut project = SourceProject::new();

        project
            .initialize_from_directory(&shared_resource_path("project"))
            .unwrap();

        assert_eq!(2, project.len());
        let declarations = project.declarations();
        assert!(declarations.variables.iter().all(|v| v.name != "gHiddenInfo"));
        assert!(declarations.variables.iter().all(|v| v.name != "gLibraryInfo"));
        assert!(declarations.variables.iter().any(|v| v.name == "gMachine"));
    }

    #[test]
    fn add_files_when_missing_file_then_err() {
        let mut project = SourceProject::new();

        let errors = project
            .add_files(&[PathBuf::from("/nonexistent/Global.var")])
            .unwrap_err();

        assert_eq!(1, errors.len());
    }
}
