use fpdiff::{format_single, generate};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, SampleArgs};
use crate::terminal;

/// Print the generated samples, one per line.
pub fn cmd_inputs(args: &SampleArgs) -> i32 {
    match generate(args.generator.into(), args.seed, args.count) {
        Ok(samples) => {
            for (i, value) in samples.iter().enumerate() {
                println!("#{}: {}", i + 1, format_single(*value));
            }
            EXIT_SUCCESS
        }
        Err(err) => {
            terminal::error(&format!("Input generation failed: {err}"));
            EXIT_FAILURE
        }
    }
}
