use std::path::PathBuf;

use clap::Parser;

use alarmgen::cli;
use alarmgen::logger;
use alarmgen::settings::{Settings, SettingsArgs};

#[derive(Parser, Debug)]
#[command(
    name = "alarmgen",
    about = "Generates alarm configuration, texts and code for Automation Studio projects"
)]
struct Args {
    /// Turn on verbose logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the log to the file instead of the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Regenerates the alarm artifacts. Run before building the project.
    Prebuild {
        /// Root directory of the project.
        #[arg(long, default_value = ".")]
        project: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Stores settings in the project.
    Configure {
        /// Root directory of the project.
        #[arg(long, default_value = ".")]
        project: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Prints the alarms of the project as JSON.
    Alarms {
        /// Root directory of the project.
        #[arg(long, default_value = ".")]
        project: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

impl Action {
    fn project(&self) -> (&PathBuf, &SettingsArgs) {
        match self {
            Action::Prebuild { project, settings }
            | Action::Configure { project, settings }
            | Action::Alarms { project, settings } => (project, settings),
        }
    }
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    // Broken settings are reported by the action.
    let (project, settings) = args.action.project();
    let debug = Settings::load(project)
        .map(|stored| stored.with_args(settings).debug)
        .unwrap_or(false);

    logger::configure(args.verbose, args.log_file.as_deref(), debug)?;

    match args.action {
        Action::Prebuild { project, settings } => cli::prebuild(&project, &settings, false),
        Action::Configure { project, settings } => cli::configure(&project, &settings, false),
        Action::Alarms { project, settings } => cli::alarms(&project, &settings, false),
    }
}
