//! Implements the command line behavior.

use std::collections::HashMap;
use std::path::Path;

use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::Location;
use alarmgen_sources::{discovery, Source};
use codespan_reporting::{
    diagnostic::{Diagnostic, Label, LabelStyle, Severity},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use log::{debug, info};

use crate::settings::{Settings, SettingsArgs};
use crate::stages::{self, Options};

/// Regenerates the alarm artifacts of the project.
pub fn prebuild(project: &Path, args: &SettingsArgs, suppress_output: bool) -> Result<(), String> {
    let settings = load_settings(project, args, suppress_output)?;
    let options = Options {
        project_dir: project.to_path_buf(),
        settings,
    };

    let written = stages::prebuild(&options).map_err(|err| report(err, suppress_output))?;

    if !suppress_output {
        if written.is_empty() {
            println!("OK, alarms are up to date");
        } else {
            println!("OK, updated {} files", written.len());
        }
    }
    Ok(())
}

/// Stores the settings in the project.
pub fn configure(project: &Path, args: &SettingsArgs, suppress_output: bool) -> Result<(), String> {
    let settings = load_settings(project, args, suppress_output)?;

    if !settings.configuration.is_empty() {
        let layout =
            discovery::discover(project).map_err(|err| report(vec![err], suppress_output))?;
        let configurations = layout.configurations();
        if !configurations.contains(&settings.configuration) {
            return Err(format!(
                "Configuration {} is not one of: {}",
                settings.configuration,
                configurations.join(", ")
            ));
        }
    }

    settings
        .save(project)
        .map_err(|err| report(vec![err], suppress_output))?;
    info!("Configured project {}", project.display());
    Ok(())
}

/// Prints the alarms of the project as JSON.
pub fn alarms(project: &Path, args: &SettingsArgs, suppress_output: bool) -> Result<(), String> {
    let settings = load_settings(project, args, suppress_output)?;
    let options = Options {
        project_dir: project.to_path_buf(),
        settings,
    };

    let (_, analysis) =
        stages::analyze_project(&options).map_err(|err| report(err, suppress_output))?;
    let json = serde_json::to_string_pretty(&analysis.alarms).map_err(|err| err.to_string())?;

    if !suppress_output {
        println!("{}", json);
    }
    Ok(())
}

/// Reads the stored settings and applies the arguments.
pub fn load_settings(
    project: &Path,
    args: &SettingsArgs,
    suppress_output: bool,
) -> Result<Settings, String> {
    Settings::load(project)
        .map(|settings| settings.with_args(args))
        .map_err(|err| report(vec![err], suppress_output))
}

fn report(diagnostics: Vec<alarmgen_dsl::diagnostic::Diagnostic>, suppress_output: bool) -> String {
    let count = diagnostics.len();
    for diagnostic in diagnostics {
        debug!("{} {}", diagnostic.code, diagnostic.description());
        handle_diagnostic(diagnostic, suppress_output);
    }
    format!("Number of errors: {}", count)
}

fn handle_diagnostic(diagnostic: alarmgen_dsl::diagnostic::Diagnostic, suppress_output: bool) {
    if suppress_output {
        return;
    }

    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();

    let mut files: SimpleFiles<String, String> = SimpleFiles::new();
    let mut ids = HashMap::new();
    for file_id in diagnostic.file_ids() {
        if file_id.as_str().is_empty() {
            continue;
        }
        if let Ok(source) = Source::try_from_path(Path::new(file_id.as_str())) {
            let id = files.add(file_id.to_string(), source.as_string().to_string());
            ids.insert(file_id.clone(), id);
        }
    }

    let diagnostic = map_diagnostic(diagnostic, &ids);

    let _ = term::emit(&mut writer.lock(), &config, &files, &diagnostic).map_err(|err| {
        println!("Failed writing to terminal: {}", err);
        1usize
    });
}

/// Returns the label as a codespan label or as a note when the label does
/// not refer to a position in a readable file.
fn map_label(
    label: alarmgen_dsl::diagnostic::Label,
    style: LabelStyle,
    ids: &HashMap<FileId, usize>,
) -> Result<Label<usize>, String> {
    match (&label.location, ids.get(&label.file_id)) {
        (Location::OffsetRange(range), Some(id)) => {
            Ok(Label::new(style, *id, range.clone()).with_message(label.message))
        }
        _ if label.file_id.as_str().is_empty() => Err(label.message),
        _ => Err(format!("{}: {}", label.file_id, label.message)),
    }
}

fn map_diagnostic(
    diagnostic: alarmgen_dsl::diagnostic::Diagnostic,
    ids: &HashMap<FileId, usize>,
) -> Diagnostic<usize> {
    let description = diagnostic.description();

    let mut labels = vec![];
    let mut notes = vec![];

    let primary = std::iter::once((diagnostic.primary, LabelStyle::Primary));
    let secondary = diagnostic
        .secondary
        .into_iter()
        .map(|label| (label, LabelStyle::Secondary));
    for (label, style) in primary.chain(secondary) {
        match map_label(label, style, ids) {
            Ok(label) => labels.push(label),
            Err(note) => notes.push(note),
        }
    }

    Diagnostic::new(Severity::Error)
        .with_code(diagnostic.code)
        .with_message(description)
        .with_labels(labels)
        .with_notes(notes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use alarmgen_dsl::core::FileId;
    use alarmgen_dsl::diagnostic::{Diagnostic, Label};
    use alarmgen_problems::Problem;
    use alarmgen_test::copy_shared_resource_dir;
    use tempfile::TempDir;

    use super::{alarms, configure, map_diagnostic, prebuild};
    use crate::settings::{Settings, SettingsArgs};

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        copy_shared_resource_dir("project", dir.path()).unwrap();
        dir
    }

    #[test]
    fn prebuild_when_project_then_ok() {
        let dir = project();

        let result = prebuild(dir.path(), &SettingsArgs::default(), true);

        assert!(result.is_ok());
    }

    #[test]
    fn prebuild_when_not_project_then_err() {
        let dir = TempDir::new().unwrap();

        let result = prebuild(dir.path(), &SettingsArgs::default(), true);

        assert_eq!(Err(String::from("Number of errors: 1")), result);
    }

    #[test]
    fn configure_when_known_configuration_then_saved() {
        let dir = project();
        let args = SettingsArgs {
            configuration: Some(String::from("Config1")),
            ..SettingsArgs::default()
        };

        configure(dir.path(), &args, true).unwrap();

        assert_eq!("Config1", Settings::load(dir.path()).unwrap().configuration);
    }

    #[test]
    fn configure_when_unknown_configuration_then_err_and_not_saved() {
        let dir = project();
        let args = SettingsArgs {
            configuration: Some(String::from("Config9")),
            ..SettingsArgs::default()
        };

        let result = configure(dir.path(), &args, true);

        assert!(result.is_err());
        assert!(!dir.path().join("AlarmGen.json").exists());
    }

    #[test]
    fn alarms_when_project_then_ok() {
        let dir = project();

        assert!(alarms(dir.path(), &SettingsArgs::default(), true).is_ok());
    }

    #[test]
    fn alarms_when_settings_malformed_then_err() {
        let dir = project();
        fs::write(dir.path().join("AlarmGen.json"), "[").unwrap();

        assert!(alarms(dir.path(), &SettingsArgs::default(), true).is_err());
    }

    #[test]
    fn map_diagnostic_when_file_label_then_note() {
        let diagnostic = Diagnostic::problem(
            Problem::FileNotFound,
            Label::file(FileId::from_string("Logical"), "Unable to find Alarms.tmx"),
        );

        let mapped = map_diagnostic(diagnostic, &HashMap::new());

        assert_eq!(Some(String::from("P0002")), mapped.code);
        assert!(mapped.labels.is_empty());
        assert_eq!(
            vec![String::from("Logical: Unable to find Alarms.tmx")],
            mapped.notes
        );
    }

    #[test]
    fn map_diagnostic_when_offset_label_in_known_file_then_label() {
        let file_id = FileId::from_string("Alarms.st");
        let diagnostic = Diagnostic::problem(
            Problem::MarkerEndMissing,
            Label::offset(file_id.clone(), 4..10, "Start of generated code"),
        );
        let ids = HashMap::from([(file_id, 0usize)]);

        let mapped = map_diagnostic(diagnostic, &ids);

        assert_eq!(1, mapped.labels.len());
        assert_eq!(4..10, mapped.labels[0].range);
        assert!(mapped.notes.is_empty());
    }
}
