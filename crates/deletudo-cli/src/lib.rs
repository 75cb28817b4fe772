//! Deletudo CLI Library
//!
//! Release tooling for the Deletudo browser extension.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{BrowserTarget, Cli, ColorArg, Commands, PackageArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
