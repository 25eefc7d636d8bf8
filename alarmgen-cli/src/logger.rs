//! Logging for the command line.
//!
//! Log lines have the form `[LEVEL file:line timestamp] message` and go to
//! stderr or, when given, to a log file.
use env_logger::{Builder, Target};
use log::{trace, LevelFilter};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use time::OffsetDateTime;

/// Installs the global logger.
///
/// Each verbosity step enables one more level. The `debug` project setting
/// enables at least debug messages.
pub fn configure(verbosity: u8, log_file: Option<&Path>, debug: bool) -> Result<(), String> {
    let log_level = level(verbosity, debug)?;

    let mut builder = Builder::new();
    if let Some(path) = log_file {
        builder.target(Target::Pipe(Box::new(open_log_file(path)?)));
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{} {:?}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                OffsetDateTime::now_utc(),
                record.args()
            )
        })
        .filter_level(log_level)
        .try_init()
        .map_err(|err| format!("Unable to start logging. {}", err))?;

    trace!("Logging at level {}", log_level);
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, String> {
    File::create(path)
        .map_err(|err| format!("Unable to create log file {}. {}", path.display(), err))
}

/// Returns the level filter for the verbosity.
fn level(verbosity: u8, debug: bool) -> Result<LevelFilter, String> {
    let log_level = match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        4 => LevelFilter::Trace,
        _ => return Err(String::from("Don't be crazy with verbose")),
    };
    if debug {
        Ok(log_level.max(LevelFilter::Debug))
    } else {
        Ok(log_level)
    }
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use tempfile::TempDir;

    use super::{configure, level, open_log_file};

    #[test]
    fn configure_when_verbosity_is_5_then_return_err() {
        assert!(configure(5, None, false).is_err());
    }

    #[test]
    fn level_when_debug_then_at_least_debug() {
        assert_eq!(LevelFilter::Debug, level(0, true).unwrap());
        assert_eq!(LevelFilter::Trace, level(4, true).unwrap());
        assert_eq!(LevelFilter::Warn, level(1, false).unwrap());
    }

    #[test]
    fn open_log_file_when_directory_missing_then_err() {
        let dir = TempDir::new().unwrap();

        let result = open_log_file(&dir.path().join("missing").join("alarmgen.log"));

        assert!(result.unwrap_err().starts_with("Unable to create log file"));
    }
}
