use splitmig_spectrum::SpectrumError;
use thiserror::Error;

/// Errors raised while building or evaluating a demographic model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The parameter vector does not match the model's documented length.
    #[error("{model}: parameter count mismatch (expected {expected}, found {found})")]
    ParameterCount {
        model: &'static str,
        expected: usize,
        found: usize,
    },

    /// One sample size is needed per final population.
    #[error("Sample size count mismatch: expected {expected}, found {found}")]
    SampleSizeCount { expected: usize, found: usize },

    #[error("Invalid sample size {value} for population {index} (must be at least 1)")]
    InvalidSampleSize { index: usize, value: usize },

    /// An epoch was added when a different number of populations existed.
    #[error("Epoch {what} has dimension {found} but {expected} populations exist at that stage")]
    EpochShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Plan for {populations} populations has {found} splits (expected {expected})")]
    SplitCount {
        populations: usize,
        expected: usize,
        found: usize,
    },

    /// Engine failures are surfaced unchanged.
    #[error(transparent)]
    Engine(#[from] SpectrumError),
}
