//! CLI definitions and argument types.

use clap::{Parser, Subcommand, ValueEnum};
use fpdiff::{DEFAULT_SAMPLE_COUNT, DEFAULT_SEED, EvalPath, GeneratorKind, Strategy};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "fpdiff")]
#[command(about = "Floating-point reproducibility checker - compares a literal and an optimized evaluation bit for bit")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Exit code for a failed parse: `--help`/`--version` succeed, usage errors fail.
#[must_use]
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate both paths over the sample set and report every sample
    Run {
        #[command(flatten)]
        samples: SampleArgs,

        /// Extra input value, evaluated first (repeatable)
        #[arg(long = "input", value_name = "F32", allow_negative_numbers = true)]
        inputs: Vec<f32>,

        /// Extra input given as an IEEE-754 bit pattern, e.g. 3eccc980; evaluated after
        /// every --input value and before generated samples (repeatable)
        #[arg(long = "input-bits", value_name = "HEX")]
        input_bits: Vec<String>,

        /// Baseline evaluation path
        #[arg(long, value_enum, default_value = "reference")]
        reference: PathArg,

        /// Evaluation path under test
        #[arg(long, value_enum, default_value = "folded")]
        optimized: PathArg,

        /// C compiler command for native paths (e.g., cc, clang-20, gcc-13)
        #[arg(long, default_value = "cc")]
        cc: String,

        /// Compiler flags for a native optimized path (overrides its profile)
        #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
        cflags: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Where per-sample blocks go in text mode
        #[arg(long, value_enum, default_value = "console")]
        sink: SinkArg,
    },
    /// Print the generated samples without evaluating them
    Inputs {
        #[command(flatten)]
        samples: SampleArgs,
    },
    /// Decode IEEE-754 bit patterns back into values
    Decode {
        /// Bit patterns, e.g. 3d4cca29 or 0x3d4cca2a
        #[arg(value_name = "HEX", required = true)]
        patterns: Vec<String>,
    },
}

/// Sample generation options shared by `run` and `inputs`.
#[derive(clap::Args, Clone, Debug)]
pub struct SampleArgs {
    /// Generator seed
    #[arg(long, default_value_t = DEFAULT_SEED, allow_negative_numbers = true)]
    pub seed: i32,

    /// Number of samples to generate (0 or less generates none)
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT, allow_negative_numbers = true)]
    pub count: i32,

    /// Pseudo-random generator
    #[arg(long, value_enum, default_value = "legacy")]
    pub generator: GeneratorArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GeneratorArg {
    /// Managed-runtime compatible subtractive generator
    Legacy,
    /// ChaCha8
    Chacha,
}

impl From<GeneratorArg> for GeneratorKind {
    fn from(arg: GeneratorArg) -> Self {
        match arg {
            GeneratorArg::Legacy => Self::Legacy,
            GeneratorArg::Chacha => Self::ChaCha,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PathArg {
    /// Literal c1 * (x + c2)
    Reference,
    /// Constant-folded c1 * x + c1c2
    Folded,
    /// Folded with a fused multiply-add
    Fused,
    /// Literal expression in 8-wide lanes
    Vectorized,
    /// C kernel at -O0
    NativeBaseline,
    /// C kernel at -O3 -ffast-math
    NativeAggressive,
}

impl PathArg {
    /// Map to a library path, applying `cflags` to native paths.
    pub fn to_path(self, cflags: Option<&str>) -> EvalPath {
        match (self, cflags) {
            (Self::Reference, _) => EvalPath::Kernel(Strategy::Reference),
            (Self::Folded, _) => EvalPath::Kernel(Strategy::Folded),
            (Self::Fused, _) => EvalPath::Kernel(Strategy::Fused),
            (Self::Vectorized, _) => EvalPath::Kernel(Strategy::Vectorized),
            (Self::NativeBaseline | Self::NativeAggressive, Some(flags)) => {
                EvalPath::NativeCustom(flags.to_string())
            }
            (Self::NativeBaseline, None) => EvalPath::NativeBaseline,
            (Self::NativeAggressive, None) => EvalPath::NativeAggressive,
        }
    }
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Destination for per-sample blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SinkArg {
    /// Passing samples to stdout, failing samples to stderr
    #[default]
    Console,
    /// Through the log: info for passing, error for failing samples
    Log,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["fpdiff", "run"]).unwrap();
        let Commands::Run {
            samples,
            reference,
            optimized,
            format,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(samples.seed, 12824);
        assert_eq!(samples.count, 10);
        assert_eq!(reference, PathArg::Reference);
        assert_eq!(optimized, PathArg::Folded);
        assert_eq!(format, OutputFormat::Text);
    }

    #[test]
    fn test_run_inputs_and_paths() {
        let cli = Cli::try_parse_from([
            "fpdiff",
            "run",
            "--seed",
            "-3",
            "--input",
            "-0.25",
            "--input-bits",
            "3eccc980",
            "--optimized",
            "native-aggressive",
            "--cflags",
            "-O2 -ffast-math",
        ])
        .unwrap();
        let Commands::Run {
            samples,
            inputs,
            input_bits,
            optimized,
            cflags,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(samples.seed, -3);
        assert_eq!(inputs, vec![-0.25f32]);
        assert_eq!(input_bits, vec!["3eccc980".to_string()]);
        assert_eq!(
            optimized.to_path(cflags.as_deref()),
            EvalPath::NativeCustom("-O2 -ffast-math".to_string())
        );
    }

    #[test]
    fn test_kernel_paths_ignore_cflags() {
        assert_eq!(
            PathArg::Fused.to_path(Some("-O3")),
            EvalPath::Kernel(Strategy::Fused)
        );
    }

    fn parse_failure(args: &[&str]) -> clap::Error {
        match Cli::try_parse_from(args) {
            Ok(_) => panic!("expected {args:?} to fail"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_usage_errors_exit_with_failure() {
        for args in [
            &["fpdiff", "run", "--optimized", "turbo"][..],
            &["fpdiff", "run", "--seed", "abc"],
            &["fpdiff"],
        ] {
            assert_eq!(parse_error_exit_code(&parse_failure(args)), EXIT_FAILURE);
        }
    }

    #[test]
    fn test_help_and_version_exit_with_success() {
        for args in [&["fpdiff", "--help"][..], &["fpdiff", "--version"], &["fpdiff", "run", "-h"]] {
            assert_eq!(parse_error_exit_code(&parse_failure(args)), EXIT_SUCCESS);
        }
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["fpdiff", "-v", "-s", "inputs"]).is_err());
    }
}
