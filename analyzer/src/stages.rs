//! The stages of the analyzer in the order they run.
use alarmgen_dsl::declaration::DeclarationSet;
use alarmgen_dsl::diagnostic::Diagnostic;
use alarmgen_dsl::model::{Alarm, AlarmPath};
use log::debug;

use crate::path_resolution::{self, unique_members, DEFAULT_MAX_NESTING};
use crate::{xform_create_alarms, xform_fold_constants, xform_properties};

/// Options for analyzing declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// The largest number of passes that path resolution makes before
    /// it gives up.
    pub max_nesting: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// The result of analysis.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub paths: Vec<AlarmPath>,
    pub alarms: Vec<Alarm>,
}

/// Analyzes the declarations and returns the alarms with their properties.
pub fn analyze(
    declarations: &DeclarationSet,
    options: &AnalyzerOptions,
) -> Result<Analysis, Vec<Diagnostic>> {
    let resolved = xform_fold_constants::apply(declarations)?;
    let members = unique_members(&resolved.members);

    let paths = path_resolution::apply(&members, &resolved.variables, options.max_nesting)
        .map_err(|err| vec![err])?;

    let alarms = xform_create_alarms::apply(&paths, &members);
    let alarms = xform_properties::apply(alarms);

    debug!(
        "Analysis found {} paths and {} alarms",
        paths.len(),
        alarms.len()
    );

    Ok(Analysis { paths, alarms })
}
