//! netchange: Network Change Watcher
//!
//! Command-line front end that logs every interface or address change
//! reported by the platform backend (netlink on Linux,
//! `NotifyIpInterfaceChange` on Windows) until interrupted.

use netchange::config::{Cli, Command, ValidatedConfig, write_default_config};
use std::path::Path;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

/// Parses the command line and either writes a config template or runs
/// the watcher.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Some(Command::Init { output }) = &cli.command {
        return write_template(output);
    }

    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(config.verbose);
    tracing::info!("{config}");

    watch(config)
}

/// Writes the commented `netchange.toml` template for `netchange init`.
fn write_template(output: &Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Drives the change stream on a multi-threaded runtime.
///
/// The watcher's own receive thread blocks in the OS; the runtime only
/// consumes the stream and waits for Ctrl+C or SIGTERM.
#[cfg(not(tarpaulin_include))]
fn watch(config: ValidatedConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(config)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Watcher stopped with an error: {e}");
            exit_code::runtime_error()
        }
    }
}
