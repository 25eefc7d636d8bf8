//! Settings that are kept with the project.
//!
//! The settings live in `AlarmGen.json` in the project directory. A project
//! without the file uses the default settings. Command line arguments
//! override the stored settings for one run (`prebuild`) or change the
//! stored settings (`configure`).
use std::fs;
use std::path::{Path, PathBuf};

use alarmgen_analyzer::path_resolution::DEFAULT_MAX_NESTING;
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_problems::Problem;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "AlarmGen.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    /// The configuration under `Physical` that holds the alarm
    /// configuration. Empty searches every configuration.
    pub configuration: String,
    /// Logs the resolved alarm paths and raises the log level.
    pub debug: bool,
    pub update_tmx: bool,
    pub update_mp_config: bool,
    pub update_program: bool,
    /// File name of the translation memory without extension.
    pub tmx_name: String,
    /// File name of the alarm configuration without extension.
    pub mp_config_name: String,
    /// File name of the alarm program without extension.
    pub program_name: String,
    pub max_nesting: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configuration: String::new(),
            debug: false,
            update_tmx: true,
            update_mp_config: true,
            update_program: true,
            tmx_name: String::from("Alarms"),
            mp_config_name: String::from("AlarmsCfg"),
            program_name: String::from("Alarms"),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// Settings given on the command line. Each given value replaces the
/// stored value.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct SettingsArgs {
    /// Configuration under Physical that holds the alarm configuration.
    #[arg(long)]
    pub configuration: Option<String>,

    /// Log the resolved alarm paths.
    #[arg(long)]
    pub debug: Option<bool>,

    /// Update the translation memory.
    #[arg(long)]
    pub update_tmx: Option<bool>,

    /// Update the alarm configuration.
    #[arg(long)]
    pub update_mp_config: Option<bool>,

    /// Update the alarm program.
    #[arg(long)]
    pub update_program: Option<bool>,

    /// File name of the translation memory without extension.
    #[arg(long)]
    pub tmx_name: Option<String>,

    /// File name of the alarm configuration without extension.
    #[arg(long)]
    pub mp_config_name: Option<String>,

    /// File name of the alarm program without extension.
    #[arg(long)]
    pub program_name: Option<String>,

    /// Largest depth of nested structures.
    #[arg(long)]
    pub max_nesting: Option<usize>,
}

impl Settings {
    pub fn path(project: &Path) -> PathBuf {
        project.join(SETTINGS_FILE)
    }

    /// Reads the settings of the project or returns the default settings
    /// when the project has no settings file.
    pub fn load(project: &Path) -> Result<Settings, Diagnostic> {
        let path = Self::path(project);
        if !path.is_file() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|err| diagnostic(Problem::CannotReadFile, &path, err.to_string()))?;
        serde_json::from_str(&content).map_err(|err| {
            diagnostic(Problem::SettingsMalformed, &path, err.to_string())
                .with_context("line", err.line())
        })
    }

    /// Writes the settings into the project directory.
    pub fn save(&self, project: &Path) -> Result<(), Diagnostic> {
        let path = Self::path(project);
        let content = serde_json::to_string_pretty(self)
            .map_err(|err| diagnostic(Problem::SettingsMalformed, &path, err.to_string()))?;
        fs::write(&path, content + "\n")
            .map_err(|err| diagnostic(Problem::CannotWriteFile, &path, err.to_string()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Returns the settings with the values given in the arguments.
    pub fn with_args(mut self, args: &SettingsArgs) -> Settings {
        if let Some(configuration) = &args.configuration {
            self.configuration = configuration.clone();
        }
        if let Some(debug) = args.debug {
            self.debug = debug;
        }
        if let Some(update) = args.update_tmx {
            self.update_tmx = update;
        }
        if let Some(update) = args.update_mp_config {
            self.update_mp_config = update;
        }
        if let Some(update) = args.update_program {
            self.update_program = update;
        }
        if let Some(name) = &args.tmx_name {
            self.tmx_name = name.clone();
        }
        if let Some(name) = &args.mp_config_name {
            self.mp_config_name = name.clone();
        }
        if let Some(name) = &args.program_name {
            self.program_name = name.clone();
        }
        if let Some(max_nesting) = args.max_nesting {
            self.max_nesting = max_nesting;
        }
        self
    }
}

fn diagnostic(problem: Problem, path: &Path, message: String) -> Diagnostic {
    Diagnostic::problem(problem, Label::file(FileId::from_path(path), message))
}
