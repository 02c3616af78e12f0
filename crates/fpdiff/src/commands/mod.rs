//! Command implementations.
//!
//! Each submodule handles a specific CLI command.

mod decode;
mod inputs;
mod run;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Run { .. } => handle_run(cli),
        Commands::Inputs { samples } => inputs::cmd_inputs(samples),
        Commands::Decode { patterns } => decode::cmd_decode(patterns),
    }
}

fn handle_run(cli: &Cli) -> i32 {
    let Commands::Run {
        samples,
        inputs,
        input_bits,
        reference,
        optimized,
        cc,
        cflags,
        format,
        sink,
    } = &cli.command
    else {
        unreachable!("run command variant mismatch");
    };

    run::cmd_run(&run::RunArgs {
        samples,
        inputs,
        input_bits,
        reference: *reference,
        optimized: *optimized,
        cc,
        cflags: cflags.as_deref(),
        format: *format,
        sink: *sink,
        silent: cli.silent,
    })
}
