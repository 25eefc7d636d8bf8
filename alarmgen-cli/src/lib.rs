// Allow large errors because diagnostics carry labels and context.
#![allow(clippy::result_large_err)]

//! Command line front-end of the alarm generator.
//!
//! The front-end loads the project settings, runs the generator stages and
//! reports diagnostics on the terminal.
extern crate alarmgen_analyzer;
extern crate alarmgen_codegen;
extern crate alarmgen_dsl;
extern crate alarmgen_sources;

pub mod cli;
pub mod logger;
pub mod settings;
pub mod stages;
