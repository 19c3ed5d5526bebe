use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("invalid sweep specification: one of threads, sizes, zipfians, ratios must be a list")]
    NoSweepDimension,
    #[error("invalid sweep specification: only one field may be a list, got {}", .0.join(", "))]
    MultipleSweepDimensions(Vec<&'static str>),
    #[error("invalid sweep specification: {0} is an empty list")]
    EmptySweep(&'static str),
    #[error("unknown datastructure family: {0}")]
    UnknownFamily(String),
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("aborted: {invocation} (repetition {repetition} exited with {status})")]
    BenchmarkProcessFailure {
        invocation: String,
        repetition: usize,
        status: ExitStatus,
    },
}

impl SweepError {
    /// True for every error raised while validating the four parameter fields.
    pub fn is_invalid_sweep_specification(&self) -> bool {
        matches!(
            self,
            SweepError::NoSweepDimension
                | SweepError::MultipleSweepDimensions(_)
                | SweepError::EmptySweep(_)
        )
    }
}
