use crate::errors::ModelError;
use serde::{Deserialize, Serialize};
use splitmig_spectrum::{MigrationMatrix, Topology};

/// One interval of continuous drift, mutation and migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    /// Relative population sizes, one per population alive in the epoch.
    pub sizes: Vec<f64>,
    pub migration: MigrationMatrix,
    /// Scaled duration in units of `2 * Na` generations.
    pub duration: f64,
    /// Step-size tuning factor; `None` uses the engine default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt_fac: Option<f64>,
}

impl Epoch {
    pub fn new(sizes: Vec<f64>, migration: MigrationMatrix, duration: f64) -> Self {
        Self {
            sizes,
            migration,
            duration,
            dt_fac: None,
        }
    }

    /// Epoch without gene flow.
    pub fn isolated(sizes: Vec<f64>, duration: f64) -> Self {
        let migration = MigrationMatrix::zeros(sizes.len());
        Self::new(sizes, migration, duration)
    }

    /// Epoch whose matrix is filled from `rates` in the canonical order of
    /// `topology`.
    pub fn with_topology(
        sizes: Vec<f64>,
        topology: Topology,
        rates: &[f64],
        duration: f64,
    ) -> Result<Self, ModelError> {
        let migration = MigrationMatrix::from_topology(topology, sizes.len(), rates)?;
        Ok(Self::new(sizes, migration, duration))
    }

    pub fn with_dt_fac(mut self, dt_fac: f64) -> Self {
        self.dt_fac = Some(dt_fac);
        self
    }

    pub fn populations(&self) -> usize {
        self.sizes.len()
    }
}

/// A single step of a model plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Peel the next population off the remaining aggregate.
    Split,
    Integrate(Epoch),
}
