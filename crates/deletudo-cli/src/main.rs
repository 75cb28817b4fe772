//! Deletudo CLI: release packaging for the browser extension
//!
//! ## Usage
//!
//! ```bash
//! deletudo package --wasm-pkg crates/deletudo/pkg                     # chrome and firefox
//! deletudo package --wasm-pkg crates/deletudo/pkg --browser firefox   # one target
//! ```

use clap::Parser;
use deletudo_cli::{
    handlers::execute_package, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    deletudo::init_logging(config.verbosity.log_level());

    match cli.command {
        Commands::Package(args) => {
            let reports = execute_package(&config, &args)?;
            if !config.verbosity.is_quiet() {
                println!("\nPackaged {} release(s) into {}", reports.len(), args.out.display());
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
