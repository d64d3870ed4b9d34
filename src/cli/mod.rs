//! CLI layer: argument parsing, command dispatch and rendering

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod tree_view;

pub use args::{Cli, Commands};
pub use error::{CliError, CliResult};
