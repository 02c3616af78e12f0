//! Evaluation paths for `f(x) = 0.1 * (x + 0.1)`.
//!
//! Every path implements [`Evaluator`]. The reference path evaluates the
//! literal expression; the others apply the rewrites an optimizing compiler
//! is allowed to make, either in-process ([`Strategy`]) or by compiling the
//! same C function under different flags ([`NativeEvaluator`]).

pub mod kernel;
pub mod native;

pub use kernel::{C1, C2, FOLDED, Strategy, calculate, calculate_folded, calculate_fused};
pub use native::{Compiler, NativeEvaluator, NativeProfile};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Evaluation errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("cannot allocate output for {count} samples")]
    Allocation { count: usize },
    #[error("failed to run compiler '{command}': {source}")]
    CompilerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("compilation failed for profile '{profile}': {stderr}")]
    CompilationFailed { profile: String, stderr: String },
    #[error("failed to load library: {0}")]
    Load(#[from] libloading::Error),
    #[error("failed to find symbol '{0}': {1}")]
    SymbolNotFound(String, libloading::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("output length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ComputeError>;

/// A path that applies the transform element-wise.
///
/// Implementations must return exactly one output per input, in order.
pub trait Evaluator: Send + Sync {
    /// Name used in reports.
    fn name(&self) -> &str;

    /// Evaluate every input.
    ///
    /// # Errors
    ///
    /// Returns a [`ComputeError`] if the path cannot produce results.
    fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>>;
}

/// Reserve an output buffer without aborting on allocation failure.
pub(crate) fn alloc_output(count: usize) -> Result<Vec<f32>> {
    let mut out = Vec::new();
    out.try_reserve_exact(count)
        .map_err(|_| ComputeError::Allocation { count })?;
    Ok(out)
}

/// In-process evaluator for one [`Strategy`].
#[derive(Clone, Copy, Debug)]
pub struct KernelEvaluator {
    strategy: Strategy,
}

impl KernelEvaluator {
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }
}

impl Evaluator for KernelEvaluator {
    fn name(&self) -> &str {
        self.strategy.name()
    }

    fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>> {
        let mut out = alloc_output(inputs.len())?;
        self.strategy.apply(inputs, &mut out);
        if out.len() != inputs.len() {
            return Err(ComputeError::LengthMismatch {
                expected: inputs.len(),
                actual: out.len(),
            });
        }
        Ok(out)
    }
}

/// Selectable evaluation path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalPath {
    Kernel(Strategy),
    NativeBaseline,
    NativeAggressive,
    /// Native kernel compiled with caller-supplied flags.
    NativeCustom(String),
}

impl EvalPath {
    /// Whether this path needs a C compiler.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        !matches!(self, Self::Kernel(_))
    }

    /// Build the evaluator for this path.
    ///
    /// # Errors
    ///
    /// Native paths fail if the kernel cannot be compiled or loaded.
    pub fn build(&self, compiler: &Compiler) -> Result<Box<dyn Evaluator>> {
        let profile = match self {
            Self::Kernel(strategy) => return Ok(Box::new(KernelEvaluator::new(*strategy))),
            Self::NativeBaseline => NativeProfile::baseline(),
            Self::NativeAggressive => NativeProfile::aggressive(compiler),
            Self::NativeCustom(flags) => NativeProfile::custom(flags),
        };
        Ok(Box::new(NativeEvaluator::build(compiler, &profile)?))
    }
}

impl Default for EvalPath {
    fn default() -> Self {
        Self::Kernel(Strategy::Reference)
    }
}

impl fmt::Display for EvalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kernel(strategy) => f.write_str(strategy.name()),
            Self::NativeBaseline => f.write_str("native-baseline"),
            Self::NativeAggressive => f.write_str("native-aggressive"),
            Self::NativeCustom(flags) => write!(f, "native-custom({flags})"),
        }
    }
}

impl FromStr for EvalPath {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(strategy) = Strategy::ALL.into_iter().find(|st| st.name() == s) {
            return Ok(Self::Kernel(strategy));
        }
        match s {
            "native-baseline" => Ok(Self::NativeBaseline),
            "native-aggressive" => Ok(Self::NativeAggressive),
            other => Err(format!("unknown evaluation path '{other}'")),
        }
    }
}
