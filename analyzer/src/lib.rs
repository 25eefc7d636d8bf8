// Allow large errors because diagnostics carry labels and context.
#![allow(clippy::result_large_err)]

//! Turns extracted declarations into the alarm model.
//!
//! The stages run in order:
//!
//! 1. fold constants and resolve array bounds
//! 2. resolve the paths from global variables to alarm structures
//! 3. create one alarm per annotated boolean
//! 4. parse and validate the alarm properties
extern crate alarmgen_dsl;
extern crate alarmgen_parser;

pub mod path_resolution;
pub mod property_tree;
pub mod schema;
pub mod severity;
pub mod stages;
pub mod xform_create_alarms;
pub mod xform_fold_constants;
pub mod xform_properties;

#[cfg(test)]
mod test_helpers;
