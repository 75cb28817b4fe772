//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::config::ColorChoice;

/// Deletudo: package the Gmail delete-shortcut extension for release
#[derive(Parser, Debug)]
#[command(name = "deletudo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build per-browser release directories and zip archives
    Package(PackageArgs),
}

/// Arguments for the package command
#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Extension source directory (holds shared/, chrome/, firefox/)
    #[arg(long, default_value = "extension")]
    pub source: PathBuf,

    /// Output directory for release folders and archives
    #[arg(short, long, default_value = "releases")]
    pub out: PathBuf,

    /// Browser targets to package, in order
    #[arg(long = "browser", value_enum, default_values = ["chrome", "firefox"])]
    pub browsers: Vec<BrowserTarget>,

    /// wasm-bindgen output directory, copied into pkg/ of each release
    #[arg(long)]
    pub wasm_pkg: Option<PathBuf>,
}

/// Browser a release is built for
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserTarget {
    /// Chromium-based browsers
    Chrome,
    /// Firefox
    Firefox,
}

impl BrowserTarget {
    /// Directory and archive name component
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

impl fmt::Display for BrowserTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
