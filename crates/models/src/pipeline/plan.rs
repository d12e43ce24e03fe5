//! Declarative model plans and the evaluator that drives an engine through them.
//!
//! A plan starts from one ancestral population and is a sequence of splits
//! and integration epochs. Splits peel populations off the front of the
//! remaining aggregate: the `k`-th split divides axis `k` into `ns[k]`
//! samples (kept in place) and the sum of all later sample sizes (appended
//! as the last axis).

use super::epoch::{Epoch, Stage};
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};
use splitmig_spectrum::{Engine, Spectrum};
use tracing::{debug, instrument};

/// Concrete arguments of one split, derived from the sample sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSpec {
    pub axis: usize,
    pub left: usize,
    pub right: usize,
}

/// Ordered stages of a demographic model with a fixed final population count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPlan {
    populations: usize,
    stages: Vec<Stage>,
}

impl ModelPlan {
    pub fn builder(populations: usize) -> PlanBuilder {
        PlanBuilder::new(populations)
    }

    /// Number of populations at the end of the plan.
    pub fn populations(&self) -> usize {
        self.populations
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Integration epochs in order.
    pub fn epochs(&self) -> impl Iterator<Item = &Epoch> {
        self.stages.iter().filter_map(|stage| match stage {
            Stage::Integrate(epoch) => Some(epoch),
            Stage::Split => None,
        })
    }

    /// Apply the same step-size tuning factor to every epoch.
    pub fn with_dt_fac(mut self, dt_fac: f64) -> Self {
        for stage in &mut self.stages {
            if let Stage::Integrate(epoch) = stage {
                epoch.dt_fac = Some(dt_fac);
            }
        }
        self
    }

    /// Split arguments implied by `ns` under the left-to-right peeling order.
    pub fn splits(&self, ns: &[usize]) -> Result<Vec<SplitSpec>, ModelError> {
        self.check_sample_sizes(ns)?;
        Ok((0..self.populations - 1)
            .map(|axis| SplitSpec {
                axis,
                left: ns[axis],
                right: ns[axis + 1..].iter().sum(),
            })
            .collect())
    }

    /// Run the plan on `engine` and return the final spectrum.
    ///
    /// The sample sizes are validated before the engine is touched.
    #[instrument(skip(self, engine), fields(populations = self.populations))]
    pub fn evaluate<E: Engine + ?Sized>(
        &self,
        ns: &[usize],
        engine: &E,
    ) -> Result<Spectrum, ModelError> {
        let mut splits = self.splits(ns)?.into_iter();
        let total: usize = ns.iter().sum();

        let mut fs = engine.steady_state(total)?;
        for stage in &self.stages {
            match stage {
                Stage::Split => {
                    // The builder guarantees exactly `populations - 1` splits.
                    let Some(split) = splits.next() else {
                        break;
                    };
                    debug!(axis = split.axis, left = split.left, right = split.right, "split");
                    fs = engine.split(fs, split.axis, split.left, split.right)?;
                }
                Stage::Integrate(epoch) => {
                    debug!(
                        populations = epoch.populations(),
                        duration = epoch.duration,
                        dt_fac = ?epoch.dt_fac,
                        "integrate"
                    );
                    fs = engine.integrate(
                        fs,
                        &epoch.sizes,
                        epoch.duration,
                        &epoch.migration,
                        epoch.dt_fac,
                    )?;
                }
            }
        }
        Ok(fs)
    }

    fn check_sample_sizes(&self, ns: &[usize]) -> Result<(), ModelError> {
        if ns.len() != self.populations {
            return Err(ModelError::SampleSizeCount {
                expected: self.populations,
                found: ns.len(),
            });
        }
        if let Some((index, &value)) = ns.iter().enumerate().find(|(_, &n)| n == 0) {
            return Err(ModelError::InvalidSampleSize { index, value });
        }
        Ok(())
    }
}

/// Fluent builder for [`ModelPlan`].
///
/// Tracks the number of populations alive after each stage and rejects
/// epochs whose dimensions disagree with it. The first error is kept and
/// reported by [`PlanBuilder::build`].
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    populations: usize,
    current: usize,
    stages: Vec<Stage>,
    error: Option<ModelError>,
}

impl PlanBuilder {
    pub fn new(populations: usize) -> Self {
        Self {
            populations,
            current: 1,
            stages: Vec::new(),
            error: None,
        }
    }

    pub fn split(mut self) -> Self {
        self.current += 1;
        self.stages.push(Stage::Split);
        self
    }

    pub fn integrate(mut self, epoch: Epoch) -> Self {
        if self.error.is_none() {
            if epoch.sizes.len() != self.current {
                self.error = Some(ModelError::EpochShape {
                    what: "sizes",
                    expected: self.current,
                    found: epoch.sizes.len(),
                });
            } else if epoch.migration.dim() != self.current {
                self.error = Some(ModelError::EpochShape {
                    what: "migration matrix",
                    expected: self.current,
                    found: epoch.migration.dim(),
                });
            }
        }
        self.stages.push(Stage::Integrate(epoch));
        self
    }

    pub fn build(self) -> Result<ModelPlan, ModelError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let splits = self.current - 1;
        if self.populations == 0 || splits != self.populations - 1 {
            return Err(ModelError::SplitCount {
                populations: self.populations,
                expected: self.populations.saturating_sub(1),
                found: splits,
            });
        }
        Ok(ModelPlan {
            populations: self.populations,
            stages: self.stages,
        })
    }
}
