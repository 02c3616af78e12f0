//! fpdiff - floating-point reproducibility checker
//!
//! Evaluates `0.1 * (x + 0.1)` over a deterministic sample set through a
//! literal reference path and an optimized path, then compares the results
//! bit for bit.
//!
//! # Example
//!
//! ```
//! use fpdiff::{RunConfig, run};
//!
//! let report = run(&RunConfig::new().with_seed(12824).with_sample_count(10))?;
//! assert_eq!(report.samples.len(), 10);
//! # Ok::<(), fpdiff::Error>(())
//! ```

// Re-export from sub-crates
pub use fpdiff_eval::{
    C1, C2, Compiler, ComputeError, EvalPath, Evaluator, FOLDED, KernelEvaluator,
    NativeEvaluator, NativeProfile, Strategy,
};
pub use fpdiff_input::{GenerateError, GeneratorKind, LegacyRandom, generate};

mod config;
mod error;
pub mod metrics;
pub mod report;

pub use config::{DEFAULT_SAMPLE_COUNT, DEFAULT_SEED, RunConfig};
pub use error::{Error, Result};
pub use report::{
    ParseBitsError, Report, ReportError, ReportSink, ResultPair, TracingSink, Verdict, compare,
    decode_bits, format_single,
};

use std::time::Instant;

use tracing::{debug, info_span};

/// Pre-supplied inputs followed by the generated samples.
///
/// # Errors
///
/// Returns [`Error::InputGeneration`] if the samples cannot be generated.
pub fn prepare_inputs(config: &RunConfig) -> Result<Vec<f32>> {
    let generated = generate(config.generator, config.seed, config.sample_count)?;
    let mut inputs = Vec::with_capacity(config.inputs.len() + generated.len());
    inputs.extend_from_slice(&config.inputs);
    inputs.extend(generated);
    Ok(inputs)
}

/// Build one path and run it over `inputs`, returning its name and results.
fn evaluate_path(
    path: &EvalPath,
    compiler: &Compiler,
    inputs: &[f32],
) -> Result<(String, Vec<f32>)> {
    let start = Instant::now();
    let compute_err = |source: ComputeError| Error::Compute {
        evaluator: path.to_string(),
        source,
    };

    let evaluator = path.build(compiler).map_err(compute_err)?;
    let results = evaluator.evaluate(inputs).map_err(compute_err)?;
    if results.len() != inputs.len() {
        return Err(compute_err(ComputeError::LengthMismatch {
            expected: inputs.len(),
            actual: results.len(),
        }));
    }

    let secs = start.elapsed().as_secs_f64();
    debug!(evaluator = evaluator.name(), secs, "evaluation finished");
    metrics::record_evaluation(evaluator.name(), secs);
    Ok((evaluator.name().to_string(), results))
}

/// Run both paths over the configured inputs and compare them.
///
/// The two paths run concurrently and share only the read-only input
/// buffer. If either fails, no report is produced; the reference error is
/// returned when both fail.
///
/// # Errors
///
/// Returns [`Error::InputGeneration`] or [`Error::Compute`]. Mismatching
/// results are reported, not returned as errors.
pub fn run(config: &RunConfig) -> Result<Report> {
    let span = info_span!(
        "run",
        seed = config.seed,
        count = config.sample_count,
        reference = %config.reference,
        optimized = %config.optimized,
    );
    let _enter = span.enter();

    let inputs = prepare_inputs(config)?;
    debug!(samples = inputs.len(), "inputs ready");

    let (reference, optimized) = rayon::join(
        || evaluate_path(&config.reference, &config.compiler, &inputs),
        || evaluate_path(&config.optimized, &config.compiler, &inputs),
    );
    let (reference_name, reference) = reference?;
    let (optimized_name, optimized) = optimized?;

    let samples = compare(&inputs, &reference, &optimized)?;
    let report = Report::new(
        config.seed,
        config.generator,
        reference_name,
        optimized_name,
        samples,
    );
    metrics::record_report(&report);
    Ok(report)
}
