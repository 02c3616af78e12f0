use fpdiff_eval::ComputeError;
use fpdiff_input::GenerateError;
use thiserror::Error;

use crate::report::ReportError;

/// Run errors. A mismatch between the two paths is not an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input generation failed: {0}")]
    InputGeneration(#[from] GenerateError),
    #[error("evaluator '{evaluator}' failed: {source}")]
    Compute {
        evaluator: String,
        #[source]
        source: ComputeError,
    },
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

pub type Result<T> = std::result::Result<T, Error>;
