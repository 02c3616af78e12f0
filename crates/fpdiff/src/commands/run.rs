use fpdiff::{Compiler, Report, RunConfig, TracingSink, decode_bits};
use tracing::debug;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, OutputFormat, PathArg, SampleArgs, SinkArg};
use crate::terminal::{self, ConsoleSink, Spinner};

/// Arguments for the `run` command.
pub struct RunArgs<'a> {
    pub samples: &'a SampleArgs,
    pub inputs: &'a [f32],
    pub input_bits: &'a [String],
    pub reference: PathArg,
    pub optimized: PathArg,
    pub cc: &'a str,
    pub cflags: Option<&'a str>,
    pub format: OutputFormat,
    pub sink: SinkArg,
    pub silent: bool,
}

/// Build the run configuration from CLI arguments.
///
/// Inputs are ordered `--input` values, then `--input-bits` values.
fn build_config(args: &RunArgs<'_>) -> Result<RunConfig, String> {
    let mut inputs = args.inputs.to_vec();
    for pattern in args.input_bits {
        inputs.push(decode_bits(pattern).map_err(|e| e.to_string())?);
    }

    let compiler: Compiler = args.cc.parse()?;
    Ok(RunConfig::new()
        .with_seed(args.samples.seed)
        .with_sample_count(args.samples.count)
        .with_generator(args.samples.generator.into())
        .with_inputs(inputs)
        // --cflags only customizes the path under test
        .with_reference(args.reference.to_path(None))
        .with_optimized(args.optimized.to_path(args.cflags))
        .with_compiler(compiler))
}

fn print_report(report: &Report, args: &RunArgs<'_>) -> i32 {
    match args.format {
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                terminal::error(&format!("Failed to serialize report: {err}"));
                return EXIT_FAILURE;
            }
        },
        OutputFormat::Text => match args.sink {
            SinkArg::Console => report.emit(&mut ConsoleSink::new(args.silent)),
            SinkArg::Log => report.emit(&mut TracingSink),
        },
    }
    EXIT_SUCCESS
}

/// Run both paths and print the report.
pub fn cmd_run(args: &RunArgs<'_>) -> i32 {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(err) => {
            terminal::error(&err);
            return EXIT_FAILURE;
        }
    };
    debug!(?config, "run configuration");

    let spinner = (config.needs_compiler() && !args.silent && args.format == OutputFormat::Text)
        .then(|| Spinner::new(format!("Compiling native kernels with {}...", config.compiler)));

    match fpdiff::run(&config) {
        Ok(report) => {
            if let Some(spinner) = spinner {
                spinner.finish_with_success("Native kernels ready");
            }
            print_report(&report, args)
        }
        Err(err) => {
            if let Some(spinner) = spinner {
                spinner.finish_with_failure(&err.to_string());
            } else {
                terminal::error(&err.to_string());
            }
            EXIT_FAILURE
        }
    }
}
