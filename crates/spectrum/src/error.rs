use thiserror::Error;

/// Error type for spectrum construction and engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),
    #[error("Axis {axis} out of range for a {populations}-population spectrum")]
    AxisOutOfRange { axis: usize, populations: usize },
    #[error("Cannot split {n} samples into {left} + {right}")]
    SplitMismatch { n: usize, left: usize, right: usize },
    #[error("Cannot project {n} samples up to {target}")]
    ProjectionTooLarge { n: usize, target: usize },
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Population size {value} at index {index} must be positive and finite")]
    InvalidPopulationSize { index: usize, value: f64 },
    #[error("Migration rate {value} at ({to}, {from}) must be non-negative and finite")]
    InvalidMigrationRate { to: usize, from: usize, value: f64 },
    #[error("Self-migration rate {value} at population {index}: diagonal must be zero")]
    NonZeroDiagonal { index: usize, value: f64 },
    #[error("Migration rate count for {topology}: expected {expected}, found {found}")]
    RateCount {
        topology: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid duration: {0} (must be non-negative and finite)")]
    InvalidDuration(f64),
    #[error("Invalid integration option {name}: {value}")]
    InvalidOption { name: &'static str, value: f64 },
    #[error("Integration diverged after {steps} steps (t = {time})")]
    Diverged { steps: usize, time: f64 },
    #[error("Singular jackknife fit for a sample of {n}")]
    SingularClosure { n: usize },
}
