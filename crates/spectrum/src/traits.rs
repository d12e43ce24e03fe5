use crate::error::SpectrumError;
use crate::migration::MigrationMatrix;
use crate::spectrum::Spectrum;

/// Core trait for spectrum evolution engines.
///
/// This is the contract demographic models are written against. An engine
/// must be able to:
/// 1.  `steady_state`: produce the equilibrium spectrum of one population.
/// 2.  `split`: divide one population axis into two diverged populations.
/// 3.  `integrate`: advance every population jointly through one epoch of
///     drift, mutation and migration.
///
/// `dt_fac` is an optional step-size tuning input; `None` selects the
/// engine's own default.
pub trait Engine {
    fn steady_state(&self, n: usize) -> Result<Spectrum, SpectrumError>;

    fn split(
        &self,
        fs: Spectrum,
        axis: usize,
        left: usize,
        right: usize,
    ) -> Result<Spectrum, SpectrumError>;

    fn integrate(
        &self,
        fs: Spectrum,
        sizes: &[f64],
        duration: f64,
        migration: &MigrationMatrix,
        dt_fac: Option<f64>,
    ) -> Result<Spectrum, SpectrumError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn steady_state(&self, n: usize) -> Result<Spectrum, SpectrumError> {
        (**self).steady_state(n)
    }

    fn split(
        &self,
        fs: Spectrum,
        axis: usize,
        left: usize,
        right: usize,
    ) -> Result<Spectrum, SpectrumError> {
        (**self).split(fs, axis, left, right)
    }

    fn integrate(
        &self,
        fs: Spectrum,
        sizes: &[f64],
        duration: f64,
        migration: &MigrationMatrix,
        dt_fac: Option<f64>,
    ) -> Result<Spectrum, SpectrumError> {
        (**self).integrate(fs, sizes, duration, migration, dt_fac)
    }
}
