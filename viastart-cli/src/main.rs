//! `viaStart` CLI - launcher for authenticated remote shell sessions
//!
//! Opens a named session after resolving and validating the username and
//! host, attaches to it, or removes it. The same binary doubles as the
//! `SSH_ASKPASS` helper for the sessions it opens.

mod cli;
mod commands;
mod console;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use viastart_core::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};
use viastart_core::transport::{is_askpass_invocation, run_askpass};

fn main() {
    if is_askpass_invocation() {
        let prompt = std::env::args().nth(1);
        if let Err(e) = run_askpass(prompt.as_deref(), &mut std::io::stdout().lock()) {
            eprintln!("viastart askpass: {e}");
            std::process::exit(error::exit_codes::GENERAL_ERROR);
        }
        return;
    }

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if let Err(e) = init_tracing(&tracing_config(&cli)) {
        eprintln!("Warning: {e}");
    }

    let result = commands::dispatch(config_path, cli.command, cli.quiet);

    if let Err(e) = result {
        if !e.is_reported() {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

fn tracing_config(cli: &Cli) -> TracingConfig {
    let level = TracingLevel::from_verbosity(if cli.quiet { 0 } else { cli.verbose });
    let mut config = TracingConfig::new().with_level(level);
    if let Some(ref path) = cli.log_file {
        config = config.with_output(TracingOutput::File { path: path.clone() });
    }
    if let Some(ref filter) = cli.log_filter {
        config = config.with_filter(filter.clone());
    }
    config
}
