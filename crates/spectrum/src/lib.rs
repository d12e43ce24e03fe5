//! Joint allele-frequency spectra and the engines that evolve them.
//!
//! Provides the spectrum container, migration matrices and the [`Engine`]
//! contract together with a native moment-equation implementation.

mod error;
mod migration;
mod spectrum;
mod strategies;
mod traits;

pub use error::SpectrumError as Error;
pub use error::SpectrumError;
pub use migration::{MigrationMatrix, Topology};
pub use spectrum::Spectrum;
pub use strategies::{EngineCall, MomentEngine, RecordingEngine, DEFAULT_DT_FAC};
pub use traits::Engine;
