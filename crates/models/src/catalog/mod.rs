//! Model catalogs and the registry used to look models up by name.
//!
//! Three catalogs are kept side by side:
//!
//! - `3d`: the three-population models integrated with the engine's own
//!   step-size factor;
//! - `3d-tuned`: the same models with eight of them integrating every epoch
//!   at [`TUNED_DT_FAC`](crate::traits::TUNED_DT_FAC); `split_nomig` and
//!   `split_sym_mig_all` are unchanged;
//! - `4d`: the four-population models.

pub mod four_pop;
mod params;
pub mod three_pop;

use crate::errors::ModelError;
use crate::pipeline::ModelPlan;
use crate::traits::{DemographicModel, Tuned};
use serde::{Deserialize, Serialize};
use splitmig_spectrum::{Engine, Spectrum};
use std::fmt;

use four_pop::*;
use three_pop::*;

/// Type-erased handle to one catalog model.
#[derive(Clone, Copy)]
pub struct ModelEntry {
    name: &'static str,
    populations: usize,
    parameters: &'static [&'static str],
    build: fn(&[f64]) -> Result<ModelPlan, ModelError>,
}

fn build<M: DemographicModel>(params: &[f64]) -> Result<ModelPlan, ModelError> {
    M::from_slice(params)?.plan()
}

impl ModelEntry {
    pub const fn of<M: DemographicModel>() -> Self {
        Self {
            name: M::NAME,
            populations: M::POPULATIONS,
            parameters: M::PARAMETERS,
            build: build::<M>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn populations(&self) -> usize {
        self.populations
    }

    /// Parameter names in positional order.
    pub fn parameters(&self) -> &'static [&'static str] {
        self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Unpack `params` and build the model's plan.
    pub fn plan(&self, params: &[f64]) -> Result<ModelPlan, ModelError> {
        (self.build)(params)
    }

    pub fn evaluate<E: Engine + ?Sized>(
        &self,
        params: &[f64],
        ns: &[usize],
        engine: &E,
    ) -> Result<Spectrum, ModelError> {
        self.plan(params)?.evaluate(ns, engine)
    }
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("name", &self.name)
            .field("populations", &self.populations)
            .field("parameters", &self.parameters)
            .finish()
    }
}

static THREE_POP: [ModelEntry; 10] = [
    ModelEntry::of::<SimSplitNoMig>(),
    ModelEntry::of::<SimSplitSymMigAdjacent>(),
    ModelEntry::of::<SimSplitAsymMigAdjacent>(),
    ModelEntry::of::<SimSplitSymMigAll>(),
    ModelEntry::of::<SimSplitAsymMigAll>(),
    ModelEntry::of::<SplitNoMig>(),
    ModelEntry::of::<SplitSymMigAll>(),
    ModelEntry::of::<SplitAsymMigAll>(),
    ModelEntry::of::<SplitSymMigAdjacent>(),
    ModelEntry::of::<SplitAsymMigAdjacent>(),
];

static THREE_POP_TUNED: [ModelEntry; 10] = [
    ModelEntry::of::<Tuned<SimSplitNoMig>>(),
    ModelEntry::of::<Tuned<SimSplitSymMigAdjacent>>(),
    ModelEntry::of::<Tuned<SimSplitAsymMigAdjacent>>(),
    ModelEntry::of::<Tuned<SimSplitSymMigAll>>(),
    ModelEntry::of::<Tuned<SimSplitAsymMigAll>>(),
    ModelEntry::of::<SplitNoMig>(),
    ModelEntry::of::<SplitSymMigAll>(),
    ModelEntry::of::<Tuned<SplitAsymMigAll>>(),
    ModelEntry::of::<Tuned<SplitSymMigAdjacent>>(),
    ModelEntry::of::<Tuned<SplitAsymMigAdjacent>>(),
];

static FOUR_POP: [ModelEntry; 10] = [
    ModelEntry::of::<SimSplitNoMig4D>(),
    ModelEntry::of::<SimSplitAllSymMig4D>(),
    ModelEntry::of::<SimSplitAllAsymMig4D>(),
    ModelEntry::of::<SimSplitSymMigBarrier4D>(),
    ModelEntry::of::<SimSplitAsymMigBarrier4D>(),
    ModelEntry::of::<SplitSymMig4D>(),
    ModelEntry::of::<SplitAsymMigAll4D>(),
    ModelEntry::of::<SplitNoMig4D>(),
    ModelEntry::of::<SplitSymMigBarrier4D>(),
    ModelEntry::of::<SplitAsymMigBarrier4D>(),
];

/// Named model collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Catalog {
    ThreePop,
    ThreePopTuned,
    FourPop,
}

impl Catalog {
    /// Every catalog, in lookup order.
    pub const ALL: [Catalog; 3] = [Catalog::ThreePop, Catalog::ThreePopTuned, Catalog::FourPop];

    pub fn models(&self) -> &'static [ModelEntry] {
        match self {
            Catalog::ThreePop => &THREE_POP,
            Catalog::ThreePopTuned => &THREE_POP_TUNED,
            Catalog::FourPop => &FOUR_POP,
        }
    }

    pub fn find(&self, name: &str) -> Option<&'static ModelEntry> {
        self.models().iter().find(|entry| entry.name == name)
    }

    pub fn populations(&self) -> usize {
        match self {
            Catalog::ThreePop | Catalog::ThreePopTuned => 3,
            Catalog::FourPop => 4,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::ThreePop
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreePop => write!(f, "3d"),
            Self::ThreePopTuned => write!(f, "3d-tuned"),
            Self::FourPop => write!(f, "4d"),
        }
    }
}

impl std::str::FromStr for Catalog {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3d" => Ok(Self::ThreePop),
            "3d-tuned" => Ok(Self::ThreePopTuned),
            "4d" => Ok(Self::FourPop),
            _ => Err(format!("Unknown catalog: {s}. Available: 3d, 3d-tuned, 4d")),
        }
    }
}

/// First model called `name`, searching catalogs in [`Catalog::ALL`] order.
pub fn find_model(name: &str) -> Option<(Catalog, &'static ModelEntry)> {
    Catalog::ALL
        .iter()
        .find_map(|&catalog| catalog.find(name).map(|entry| (catalog, entry)))
}
