//! The stages of a generator run.
//!
//! Every artifact is generated in memory first. The files are written only
//! when every artifact was generated so that a failure leaves the project
//! as it was. Files whose content does not change are not written.
use std::path::{Path, PathBuf};

use alarmgen_analyzer::stages::{analyze, Analysis, AnalyzerOptions};
use alarmgen_codegen::declarations::{update_flag_types, update_variables};
use alarmgen_codegen::mpconfig::update_alarm_config;
use alarmgen_codegen::names::all_names;
use alarmgen_codegen::program::{update_program, Dialect};
use alarmgen_codegen::tmx::update_tmx;
use alarmgen_dsl::diagnostic::Diagnostic;
use alarmgen_dsl::model::Alarm;
use alarmgen_problems::Problem;
use alarmgen_sources::discovery::{self, find_file};
use alarmgen_sources::source::{diagnostic, write_file};
use alarmgen_sources::{ProjectLayout, Source, SourceProject};
use log::{debug, info};

use crate::settings::Settings;

/// Options for one run. The options do not change during the run.
#[derive(Clone, Debug)]
pub struct Options {
    pub project_dir: PathBuf,
    pub settings: Settings,
}

/// The new content of a file.
pub struct Artifact {
    pub source: Source,
    pub content: String,
}

impl Artifact {
    pub fn is_changed(&self) -> bool {
        self.source.as_string() != self.content
    }
}

/// Reads the declarations of the project and returns the alarm model.
pub fn analyze_project(options: &Options) -> Result<(ProjectLayout, Analysis), Vec<Diagnostic>> {
    let layout = discovery::discover(&options.project_dir).map_err(|err| vec![err])?;

    let mut project = SourceProject::new();
    project.initialize_from_directory(&options.project_dir)?;

    let analyzer_options = AnalyzerOptions {
        max_nesting: options.settings.max_nesting,
    };
    let analysis = analyze(&project.declarations(), &analyzer_options)?;

    if options.settings.debug {
        for (idx, alarm) in analysis.alarms.iter().enumerate() {
            debug!("Path to alarm {}: {}", idx + 1, alarm);
        }
    }

    Ok((layout, analysis))
}

/// Regenerates the artifacts that the settings enable and returns the
/// files that were written.
pub fn prebuild(options: &Options) -> Result<Vec<PathBuf>, Vec<Diagnostic>> {
    let (layout, analysis) = analyze_project(options)?;
    let artifacts = generate(&layout, &analysis.alarms, &options.settings)?;
    commit(&artifacts)
}

/// Generates every enabled artifact. Reports the problems of every artifact
/// that could not be generated.
pub fn generate(
    layout: &ProjectLayout,
    alarms: &[Alarm],
    settings: &Settings,
) -> Result<Vec<Artifact>, Vec<Diagnostic>> {
    let mut artifacts = vec![];
    let mut errors = vec![];

    if settings.update_tmx {
        match tmx_artifact(layout, alarms, settings) {
            Ok(artifact) => artifacts.push(artifact),
            Err(err) => errors.push(err),
        }
    }

    if settings.update_mp_config {
        match config_artifact(layout, alarms, settings) {
            Ok(artifact) => artifacts.push(artifact),
            Err(err) => errors.push(err),
        }
    }

    if settings.update_program {
        match program_artifacts(layout, alarms, settings) {
            Ok(mut program) => artifacts.append(&mut program),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(artifacts)
    } else {
        Err(errors)
    }
}

fn tmx_artifact(
    layout: &ProjectLayout,
    alarms: &[Alarm],
    settings: &Settings,
) -> Result<Artifact, Diagnostic> {
    let path = layout.require_logical_file(&format!("{}.tmx", settings.tmx_name))?;
    info!("Updating {}", path.display());

    let source = Source::try_from_path(&path)?;
    let content = update_tmx(source.as_string(), &all_names(alarms), source.file_id())?;
    Ok(Artifact { source, content })
}

fn config_artifact(
    layout: &ProjectLayout,
    alarms: &[Alarm],
    settings: &Settings,
) -> Result<Artifact, Diagnostic> {
    let path = layout.require_config_file(
        &settings.configuration,
        &format!("{}.mpalarmxcore", settings.mp_config_name),
    )?;
    info!("Updating {}", path.display());

    let source = Source::try_from_path(&path)?;
    let content = update_alarm_config(
        source.as_string(),
        alarms,
        &settings.tmx_name,
        source.file_id(),
    )?;
    Ok(Artifact { source, content })
}

/// Finds the program file. A C program is preferred over Structured Text.
pub fn find_program(
    layout: &ProjectLayout,
    program_name: &str,
) -> Result<(PathBuf, Dialect), Diagnostic> {
    for dialect in Dialect::PREFERRED {
        let file_name = format!("{}.{}", program_name, dialect.extension());
        if let Some(path) = layout.find_logical_file(&file_name) {
            return Ok((path, dialect));
        }
    }
    let file_name = format!("{}.{}", program_name, Dialect::StructuredText.extension());
    layout
        .require_logical_file(&file_name)
        .map(|path| (path, Dialect::StructuredText))
}

fn program_artifacts(
    layout: &ProjectLayout,
    alarms: &[Alarm],
    settings: &Settings,
) -> Result<Vec<Artifact>, Diagnostic> {
    let (path, dialect) = find_program(layout, &settings.program_name)?;
    info!("Updating {}", path.display());

    let program = Source::try_from_path(&path)?;
    let generated = update_program(program.as_string(), alarms, dialect, program.file_id())?;

    let program_dir = path.parent().unwrap_or(Path::new("."));
    let variables_path = require_beside(program_dir, &settings.program_name, "var")?;
    let variables = Source::try_from_path(&variables_path)?;
    let variables_content = update_variables(variables.as_string(), generated.max_loops);

    let types_path = require_beside(program_dir, &settings.program_name, "typ")?;
    let types = Source::try_from_path(&types_path)?;
    let types_content = update_flag_types(types.as_string(), alarms, types.file_id())?;

    Ok(vec![
        Artifact {
            source: program,
            content: generated.text,
        },
        Artifact {
            source: variables,
            content: variables_content,
        },
        Artifact {
            source: types,
            content: types_content,
        },
    ])
}

fn require_beside(dir: &Path, name: &str, extension: &str) -> Result<PathBuf, Diagnostic> {
    let file_name = format!("{}.{}", name, extension);
    find_file(dir, &file_name).ok_or_else(|| {
        diagnostic(
            Problem::FileNotFound,
            dir,
            format!("Unable to find {} beside the program", file_name),
        )
    })
}

/// Writes the changed artifacts. Nothing is written if any artifact cannot
/// be encoded.
pub fn commit(artifacts: &[Artifact]) -> Result<Vec<PathBuf>, Vec<Diagnostic>> {
    let mut encoded = vec![];
    let mut errors = vec![];
    for artifact in artifacts.iter().filter(|artifact| artifact.is_changed()) {
        match artifact.source.encode(&artifact.content) {
            Ok(bytes) => encoded.push((artifact.source.path(), bytes)),
            Err(err) => errors.push(err),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut written = vec![];
    for (path, bytes) in encoded {
        write_file(path, &bytes).map_err(|err| vec![err])?;
        info!("Wrote {}", path.display());
        written.push(path.to_path_buf());
    }
    debug!("{} of {} files changed", written.len(), artifacts.len());
    Ok(written)
}
