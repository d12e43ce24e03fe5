//! Moment-equation engine.
//!
//! Integrates the expected spectrum under the Wright-Fisher diffusion with
//! time measured in units of `2 * Na` generations:
//!
//! - drift in population `k` with relative size `nu_k` contributes
//!   `1 / (2 nu_k)` times the tridiagonal drift operator along axis `k`;
//! - infinite-sites mutation injects `theta * n_k / 2` new singletons of
//!   population `k` per unit time;
//! - migration into `k` from `l` at scaled rate `m_kl` moves allele
//!   frequencies by `m_kl (x_l - x_k)`. The `x_l` moment needs the spectrum
//!   with one sample moved from `k` to `l`, supplied by the `closure` module.
//!
//! Apart from clipping in the closure the system is linear, so a classic
//! fourth-order Runge-Kutta step with a fixed step size is used. The step is
//! the smaller of `dt_fac` and a bound on the stiffness of the operator.

use super::closure::{pool, spread, Jackknife};
use crate::error::SpectrumError;
use crate::migration::MigrationMatrix;
use crate::spectrum::Spectrum;
use crate::traits::Engine;
use ndarray::{ArrayD, Axis, IxDyn, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default upper bound on the integration step (scaled time units).
pub const DEFAULT_DT_FAC: f64 = 0.02;

/// Largest `|h * lambda|` accepted for RK4 on the negative real axis.
const STABILITY: f64 = 2.5;

/// Native engine evolving spectra through the moment equations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentEngine {
    /// Population-scaled mutation rate `4 * Na * mu` per site.
    pub theta: f64,
    /// Step-size bound used when an epoch does not supply its own.
    pub dt_fac: f64,
}

impl Default for MomentEngine {
    fn default() -> Self {
        Self {
            theta: 1.0,
            dt_fac: DEFAULT_DT_FAC,
        }
    }
}

impl MomentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_dt_fac(mut self, dt_fac: f64) -> Self {
        self.dt_fac = dt_fac;
        self
    }

    fn check_options(&self, dt_fac: f64) -> Result<(), SpectrumError> {
        if !self.theta.is_finite() || self.theta < 0.0 {
            return Err(SpectrumError::InvalidOption {
                name: "theta",
                value: self.theta,
            });
        }
        if !dt_fac.is_finite() || dt_fac <= 0.0 {
            return Err(SpectrumError::InvalidOption {
                name: "dt_fac",
                value: dt_fac,
            });
        }
        Ok(())
    }
}

impl Engine for MomentEngine {
    fn steady_state(&self, n: usize) -> Result<Spectrum, SpectrumError> {
        debug!(n, theta = self.theta, "steady state");
        Spectrum::steady_state(n, self.theta)
    }

    fn split(
        &self,
        fs: Spectrum,
        axis: usize,
        left: usize,
        right: usize,
    ) -> Result<Spectrum, SpectrumError> {
        fs.split(axis, left, right)
    }

    fn integrate(
        &self,
        fs: Spectrum,
        sizes: &[f64],
        duration: f64,
        migration: &MigrationMatrix,
        dt_fac: Option<f64>,
    ) -> Result<Spectrum, SpectrumError> {
        let dt_fac = dt_fac.unwrap_or(self.dt_fac);
        self.check_options(dt_fac)?;
        let system = MomentSystem::new(&fs, sizes, migration, self.theta)?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(SpectrumError::InvalidDuration(duration));
        }
        if duration == 0.0 {
            return Ok(fs);
        }

        let h_max = dt_fac.min(STABILITY / system.stiffness());
        let steps = (duration / h_max).ceil().max(1.0) as usize;
        let h = duration / steps as f64;
        trace!(steps, h, duration, "integrating epoch");

        let mut y = fs.into_data();
        for step in 0..steps {
            y = system.rk4_step(&y, h);
            if !y.iter().all(|v| v.is_finite()) {
                return Err(SpectrumError::Diverged {
                    steps: step + 1,
                    time: h * (step + 1) as f64,
                });
            }
        }
        Spectrum::from_array(y)
    }
}

/// Right-hand side of the moment equations for one epoch.
struct MomentSystem<'a> {
    ns: Vec<usize>,
    sizes: &'a [f64],
    migration: &'a MigrationMatrix,
    theta: f64,
    jackknives: Vec<Jackknife>,
}

impl<'a> MomentSystem<'a> {
    fn new(
        fs: &Spectrum,
        sizes: &'a [f64],
        migration: &'a MigrationMatrix,
        theta: f64,
    ) -> Result<Self, SpectrumError> {
        let populations = fs.populations();
        if sizes.len() != populations {
            return Err(SpectrumError::DimensionMismatch {
                what: "population sizes",
                expected: populations,
                found: sizes.len(),
            });
        }
        if migration.dim() != populations {
            return Err(SpectrumError::DimensionMismatch {
                what: "migration matrix",
                expected: populations,
                found: migration.dim(),
            });
        }
        for (index, &value) in sizes.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SpectrumError::InvalidPopulationSize { index, value });
            }
        }
        let ns = fs.sample_sizes();
        let jackknives = ns
            .iter()
            .map(|&n| Jackknife::new(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            ns,
            sizes,
            migration,
            theta,
            jackknives,
        })
    }

    /// Bound on the spectral radius of the linear operator.
    fn stiffness(&self) -> f64 {
        let incoming = self.migration.row_sums();
        self.ns
            .iter()
            .zip(self.sizes)
            .zip(incoming)
            .map(|((&n, &nu), m)| {
                let n = n as f64;
                n * n / (2.0 * nu) + (6.0 * n + 2.0) * m
            })
            .sum::<f64>()
            .max(f64::EPSILON)
    }

    fn rk4_step(&self, y: &ArrayD<f64>, h: f64) -> ArrayD<f64> {
        let k1 = self.derivative(y);
        let k2 = self.derivative(&(y + &(&k1 * (h / 2.0))));
        let k3 = self.derivative(&(y + &(&k2 * (h / 2.0))));
        let k4 = self.derivative(&(y + &(&k3 * h)));
        let mut next = y.clone();
        next.scaled_add(h / 6.0, &k1);
        next.scaled_add(h / 3.0, &k2);
        next.scaled_add(h / 3.0, &k3);
        next.scaled_add(h / 6.0, &k4);
        next
    }

    fn derivative(&self, y: &ArrayD<f64>) -> ArrayD<f64> {
        let mut dy = ArrayD::zeros(y.raw_dim());
        for k in 0..self.ns.len() {
            self.add_drift(&mut dy, y, k);
            self.add_mutation(&mut dy, k);
        }
        for k in 0..self.ns.len() {
            for l in 0..self.ns.len() {
                let rate = if k == l { 0.0 } else { self.migration.get(k, l) };
                if rate > 0.0 {
                    self.add_migration(&mut dy, y, k, l, rate);
                }
            }
        }
        dy
    }

    fn add_drift(&self, dy: &mut ArrayD<f64>, y: &ArrayD<f64>, k: usize) {
        let n = self.ns[k];
        let coef = 1.0 / (2.0 * self.sizes[k]);
        Zip::from(dy.lanes_mut(Axis(k)))
            .and(y.lanes(Axis(k)))
            .for_each(|mut d, phi| {
                for i in 0..=n {
                    let mut v = -2.0 * (i * (n - i)) as f64 * phi[i];
                    if i > 0 {
                        v += ((i - 1) * (n - i + 1)) as f64 * phi[i - 1];
                    }
                    if i < n {
                        v += ((i + 1) * (n - i - 1)) as f64 * phi[i + 1];
                    }
                    d[i] += coef * v;
                }
            });
    }

    fn add_mutation(&self, dy: &mut ArrayD<f64>, k: usize) {
        let mut singleton = vec![0; self.ns.len()];
        singleton[k] = 1;
        dy[singleton.as_slice()] += self.theta * self.ns[k] as f64 / 2.0;
    }

    /// Migration into `k` from `l`.
    fn add_migration(&self, dy: &mut ArrayD<f64>, y: &ArrayD<f64>, k: usize, l: usize, rate: f64) {
        let n_k = self.ns[k];
        let n_l = self.ns[l];

        // -x_k term, closed at the current sample size
        Zip::from(dy.lanes_mut(Axis(k)))
            .and(y.lanes(Axis(k)))
            .for_each(|mut d, phi| {
                for i in 0..=n_k {
                    let mut v = -(i as f64) * phi[i];
                    if i < n_k {
                        v += (i + 1) as f64 * phi[i + 1];
                    }
                    d[i] += rate * v;
                }
            });

        // x_l term: E[x_l b(n_k - 1, a; x_k) b(n_l, j; x_l)]
        let psi = self.moved_sample(y, k, l);
        let mut x_shape = y.shape().to_vec();
        x_shape[k] = n_k;
        let mut x = ArrayD::zeros(IxDyn(&x_shape));
        let scale = 1.0 / (n_l + 1) as f64;
        Zip::from(x.lanes_mut(Axis(l)))
            .and(psi.lanes(Axis(l)))
            .for_each(|mut out, up| {
                for j in 0..=n_l {
                    out[j] = (j + 1) as f64 * scale * up[j + 1];
                }
            });

        let n = n_k as f64;
        Zip::from(dy.lanes_mut(Axis(k)))
            .and(x.lanes(Axis(k)))
            .for_each(|mut d, moment| {
                for i in 0..=n_k {
                    let mut v = 0.0;
                    if i > 0 {
                        v += moment[i - 1];
                    }
                    if i < n_k {
                        v -= moment[i];
                    }
                    d[i] += rate * n * v;
                }
            });
    }

    /// Spectrum at sample sizes `(n_k - 1, n_l + 1)`, clipped at zero.
    ///
    /// The part exchangeable between `k` and `l` is redistributed exactly;
    /// the rest is projected down along `k` and extended along `l`.
    fn moved_sample(&self, y: &ArrayD<f64>, k: usize, l: usize) -> ArrayD<f64> {
        let (n_k, n_l) = (self.ns[k], self.ns[l]);
        let pooled = pool(y, k, l);
        let residual = y - &spread(&pooled, k, l, n_k, n_l);
        let mut psi = self.jackknives[l].extend(&project_down_one(&residual, k), l);
        psi += &spread(&pooled, k, l, n_k - 1, n_l + 1);
        psi.mapv_inplace(|v| v.max(0.0));
        psi
    }
}

/// Exact projection of `axis` from `n` to `n - 1` samples.
fn project_down_one(y: &ArrayD<f64>, axis: usize) -> ArrayD<f64> {
    let n = y.shape()[axis] - 1;
    let mut shape = y.shape().to_vec();
    shape[axis] = n;
    let mut out = ArrayD::zeros(IxDyn(&shape));
    let inv = 1.0 / n as f64;
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(y.lanes(Axis(axis)))
        .for_each(|mut dst, src| {
            for a in 0..n {
                dst[a] = ((n - a) as f64 * src[a] + (a + 1) as f64 * src[a + 1]) * inv;
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::Topology;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn test_zero_duration_is_identity() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(6).unwrap().split(0, 3, 3).unwrap();
        let out = engine
            .integrate(fs.clone(), &[1.0, 2.0], 0.0, &MigrationMatrix::zeros(2), None)
            .unwrap();
        assert_eq!(out, fs);
    }

    #[test]
    fn test_steady_state_is_stationary() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(12).unwrap();
        let out = engine
            .integrate(fs.clone(), &[1.0], 0.3, &MigrationMatrix::zeros(1), None)
            .unwrap();
        for i in 1..12 {
            assert!(approx_eq(out.get(&[i]).unwrap(), fs.get(&[i]).unwrap(), 1e-9));
        }
        // Fixed and lost sites accumulate at the boundaries.
        assert!(out.get(&[0]).unwrap() > 0.0);
        assert!(out.get(&[12]).unwrap() > 0.0);
    }

    #[test]
    fn test_total_mass_grows_by_mutation_input() {
        let engine = MomentEngine::new().with_theta(2.0);
        let fs = engine
            .steady_state(10)
            .unwrap()
            .split(0, 4, 6)
            .unwrap();
        let before = fs.sum();
        let migration =
            MigrationMatrix::from_topology(Topology::AsymmetricAll, 2, &[0.7, 0.2]).unwrap();
        let out = engine
            .integrate(fs, &[0.5, 2.0], 0.25, &migration, None)
            .unwrap();
        // theta * (4 + 6) / 2 per unit time
        let expected = before + 0.25 * 2.0 * 10.0 / 2.0;
        assert!(approx_eq(out.sum(), expected, 1e-9));
    }

    #[test]
    fn test_symmetric_inputs_stay_symmetric() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(10).unwrap().split(0, 5, 5).unwrap();
        let migration =
            MigrationMatrix::from_topology(Topology::SymmetricAll, 2, &[0.8]).unwrap();
        let out = engine
            .integrate(fs, &[1.5, 1.5], 0.4, &migration, None)
            .unwrap();
        let swapped = out.swap_populations(0, 1).unwrap();
        for i in 0..=5 {
            for j in 0..=5 {
                assert!(approx_eq(
                    out.get(&[i, j]).unwrap(),
                    swapped.get(&[i, j]).unwrap(),
                    1e-10
                ));
            }
        }
    }

    #[test]
    fn test_migration_changes_the_spectrum() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(8).unwrap().split(0, 4, 4).unwrap();
        let isolated = engine
            .integrate(fs.clone(), &[1.0, 1.0], 1.0, &MigrationMatrix::zeros(2), None)
            .unwrap();
        let migration =
            MigrationMatrix::from_topology(Topology::SymmetricAll, 2, &[2.0]).unwrap();
        let connected = engine
            .integrate(fs, &[1.0, 1.0], 1.0, &migration, None)
            .unwrap();
        assert_ne!(connected, isolated);
        // Migration only moves mass between cells.
        assert!(approx_eq(connected.sum(), isolated.sum(), 1e-9));
    }

    #[test]
    fn test_deterministic() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(6).unwrap().split(0, 3, 3).unwrap();
        let migration =
            MigrationMatrix::from_topology(Topology::AsymmetricAll, 2, &[0.3, 0.9]).unwrap();
        let a = engine
            .integrate(fs.clone(), &[1.0, 0.5], 0.5, &migration, None)
            .unwrap();
        let b = engine.integrate(fs, &[1.0, 0.5], 0.5, &migration, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(6).unwrap().split(0, 3, 3).unwrap();
        let zero = MigrationMatrix::zeros(2);

        assert!(matches!(
            engine.integrate(fs.clone(), &[1.0], 0.1, &zero, None),
            Err(SpectrumError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            engine.integrate(fs.clone(), &[1.0, 1.0], 0.1, &MigrationMatrix::zeros(3), None),
            Err(SpectrumError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            engine.integrate(fs.clone(), &[1.0, 0.0], 0.1, &zero, None),
            Err(SpectrumError::InvalidPopulationSize { index: 1, .. })
        ));
        assert!(matches!(
            engine.integrate(fs.clone(), &[1.0, 1.0], -0.1, &zero, None),
            Err(SpectrumError::InvalidDuration(_))
        ));
        assert!(matches!(
            engine.integrate(fs, &[1.0, 1.0], 0.1, &zero, Some(0.0)),
            Err(SpectrumError::InvalidOption { name: "dt_fac", .. })
        ));
    }

    #[test]
    fn test_smaller_dt_fac_stays_close() {
        let engine = MomentEngine::new();
        let fs = engine.steady_state(6).unwrap().split(0, 3, 3).unwrap();
        let migration =
            MigrationMatrix::from_topology(Topology::SymmetricAll, 2, &[0.5]).unwrap();
        let coarse = engine
            .integrate(fs.clone(), &[1.0, 2.0], 0.5, &migration, None)
            .unwrap();
        let fine = engine
            .integrate(fs, &[1.0, 2.0], 0.5, &migration, Some(0.01))
            .unwrap();
        for (a, b) in coarse.data().iter().zip(fine.data().iter()) {
            assert!(approx_eq(*a, *b, 1e-4));
        }
    }

    #[test]
    fn test_projection_helpers() {
        let fs = Spectrum::steady_state(6, 1.0).unwrap();
        let down = project_down_one(fs.data(), 0);
        let exact = fs.project(0, 5).unwrap();
        for (a, b) in down.iter().zip(exact.data().iter()) {
            assert!(approx_eq(*a, *b, 1e-12));
        }
    }

    #[test]
    fn test_moved_sample_exact_after_split() {
        let parent = Spectrum::steady_state(9, 1.0).unwrap();
        let fs = parent.split(0, 4, 5).unwrap();
        let migration = MigrationMatrix::zeros(2);
        let system = MomentSystem::new(&fs, &[1.0, 1.0], &migration, 1.0).unwrap();

        let moved = system.moved_sample(fs.data(), 0, 1);
        let expected = parent.split(0, 3, 6).unwrap();
        assert_eq!(moved.shape(), expected.data().shape());
        for (a, b) in moved.iter().zip(expected.data().iter()) {
            assert!(approx_eq(*a, *b, 1e-12));
        }

        let moved = system.moved_sample(fs.data(), 1, 0);
        let expected = parent.split(0, 5, 4).unwrap();
        for (a, b) in moved.iter().zip(expected.data().iter()) {
            assert!(approx_eq(*a, *b, 1e-12));
        }
    }

    #[test]
    fn test_engine_config_from_json() {
        let engine: MomentEngine = serde_json::from_str(r#"{"dt_fac": 0.01}"#).unwrap();
        assert_eq!(engine.dt_fac, 0.01);
        assert_eq!(engine.theta, 1.0);
    }
}
