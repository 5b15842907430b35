//! Command line entry points and run orchestration

pub mod cli;
pub mod options;
pub mod run;
pub mod settings;
