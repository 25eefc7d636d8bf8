//! Data objects shared by the stages of the alarm generator.
//!
//! The objects fall into three groups:
//!
//! * [`declaration`] holds what the parser extracts from declaration files,
//!   before constants are folded.
//! * [`model`] and [`property`] hold the resolved alarm model that the
//!   generators consume.
//! * [`diagnostic`] holds the errors reported to users.
extern crate alarmgen_problems;

pub mod core;
pub mod declaration;
pub mod diagnostic;
pub mod expression;
pub mod model;
pub mod property;
