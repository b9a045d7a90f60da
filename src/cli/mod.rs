//! Command-line interface for inspecting inputs and points

pub mod commands;

pub use commands::{cmd_decode, cmd_point, summarize_input, summarize_point, CliResult};
