//! Leadtrail command-line tools
//!
//! Lists and validates funnel tables, shows the effective tracking
//! configuration, and emits one-off events through the configured sink.

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use error::{CliError, CliResult};
pub use router::{Cli, CommandRouter, Commands, OutputFormat};
