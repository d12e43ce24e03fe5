//! Engine wrapper that logs every primitive call before forwarding it.
//!
//! Used to inspect the exact sequence of operations a demographic model
//! issues without caring about the numbers that come back.

use super::MomentEngine;
use crate::error::SpectrumError;
use crate::migration::MigrationMatrix;
use crate::spectrum::Spectrum;
use crate::traits::Engine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One primitive engine call with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineCall {
    SteadyState {
        n: usize,
    },
    Split {
        axis: usize,
        left: usize,
        right: usize,
    },
    Integrate {
        sizes: Vec<f64>,
        duration: f64,
        migration: MigrationMatrix,
        dt_fac: Option<f64>,
    },
}

/// Records calls in issue order, then delegates to `inner`.
#[derive(Debug, Default)]
pub struct RecordingEngine<E = MomentEngine> {
    inner: E,
    calls: Mutex<Vec<EngineCall>>,
}

impl<E: Engine> RecordingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the calls recorded so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Drain the log, leaving it empty.
    pub fn take_calls(&self) -> Vec<EngineCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }
}

impl<E: Engine> Engine for RecordingEngine<E> {
    fn steady_state(&self, n: usize) -> Result<Spectrum, SpectrumError> {
        self.record(EngineCall::SteadyState { n });
        self.inner.steady_state(n)
    }

    fn split(
        &self,
        fs: Spectrum,
        axis: usize,
        left: usize,
        right: usize,
    ) -> Result<Spectrum, SpectrumError> {
        self.record(EngineCall::Split { axis, left, right });
        self.inner.split(fs, axis, left, right)
    }

    fn integrate(
        &self,
        fs: Spectrum,
        sizes: &[f64],
        duration: f64,
        migration: &MigrationMatrix,
        dt_fac: Option<f64>,
    ) -> Result<Spectrum, SpectrumError> {
        self.record(EngineCall::Integrate {
            sizes: sizes.to_vec(),
            duration,
            migration: migration.clone(),
            dt_fac,
        });
        self.inner.integrate(fs, sizes, duration, migration, dt_fac)
    }
}
