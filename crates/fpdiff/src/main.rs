//! fpdiff CLI - floating-point reproducibility checker

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use cli::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(cli::parse_error_exit_code(&err));
        }
    };

    // Initialize metrics recorder if enabled
    let metrics_handle = if cli.metrics {
        fpdiff::metrics::CliRecorder::new().install()
    } else {
        None
    };
    fpdiff::metrics::init();

    let default_level = if cli.verbose {
        "fpdiff=debug"
    } else if cli.silent {
        "fpdiff=error"
    } else {
        "fpdiff=info"
    };
    let filter = match default_level.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = commands::run_command(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}
