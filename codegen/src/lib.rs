// Allow large errors because diagnostics carry labels and context.
#![allow(clippy::result_large_err)]

//! Generates the artifacts that depend on the alarm model.
//!
//! Each generator takes the current content of a file and returns the new
//! content. Only the part of the file that belongs to the generator is
//! changed so that running a generator twice gives the same file.
//!
//! * [`tmx`] keeps the translation units in step with the alarm names
//! * [`mpconfig`] writes the alarm list of the alarm configuration
//! * [`program`] writes the cyclic program that sets and resets alarms
//! * [`declarations`] declares the variables and types of that program
extern crate alarmgen_analyzer;
extern crate alarmgen_dsl;

pub mod declarations;
mod edit;
pub mod mpconfig;
pub mod names;
pub mod program;
pub mod sentinel;
pub mod tmx;

#[cfg(test)]
mod test_helpers;
