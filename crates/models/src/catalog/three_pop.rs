//! Three-population catalog.
//!
//! Two families: simultaneous splits (`sim_split_*`), where the ancestor
//! splits into all three populations at once and a single epoch follows,
//! and sequential splits (`split_*`), where population 1 diverges from the
//! ancestor of (2, 3) first and the two share an epoch of symmetric gene
//! flow at rate `mA` before 2 and 3 separate.

use super::params::model_params;
use crate::errors::ModelError;
use crate::pipeline::{Epoch, ModelPlan};
use crate::traits::DemographicModel;
use splitmig_spectrum::Topology;

fn simultaneous(last: Epoch) -> Result<ModelPlan, ModelError> {
    ModelPlan::builder(3).split().split().integrate(last).build()
}

/// Population 1 and the (2, 3) ancestor exchanging migrants symmetrically.
fn sequential(nu1: f64, nu_a: f64, m_a: f64, t1: f64, last: Epoch) -> Result<ModelPlan, ModelError> {
    let ancestral = Epoch::with_topology(vec![nu1, nu_a], Topology::SymmetricAll, &[m_a], t1)?;
    ModelPlan::builder(3)
        .split()
        .integrate(ancestral)
        .split()
        .integrate(last)
        .build()
}

model_params! {
    /// Simultaneous split, no gene flow.
    SimSplitNoMig = "sim_split_no_mig" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitNoMig {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::isolated(vec![self.nu1, self.nu2, self.nu3], self.t1))
    }
}

model_params! {
    /// Simultaneous split, symmetric gene flow between adjacent populations.
    SimSplitSymMigAdjacent = "sim_split_sym_mig_adjacent" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        m12 => "m12",
        m23 => "m23",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitSymMigAdjacent {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::SymmetricAdjacent,
            &[self.m12, self.m23],
            self.t1,
        )?)
    }
}

model_params! {
    /// Simultaneous split, asymmetric gene flow between adjacent populations.
    SimSplitAsymMigAdjacent = "sim_split_asym_mig_adjacent" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        m12 => "m12",
        m21 => "m21",
        m23 => "m23",
        m32 => "m32",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitAsymMigAdjacent {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::AsymmetricAdjacent,
            &[self.m12, self.m21, self.m23, self.m32],
            self.t1,
        )?)
    }
}

model_params! {
    /// Simultaneous split, symmetric gene flow between every pair.
    SimSplitSymMigAll = "sim_split_sym_mig_all" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        m12 => "m12",
        m13 => "m13",
        m23 => "m23",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitSymMigAll {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::SymmetricAll,
            &[self.m12, self.m13, self.m23],
            self.t1,
        )?)
    }
}

model_params! {
    /// Simultaneous split, asymmetric gene flow between every pair.
    SimSplitAsymMigAll = "sim_split_asym_mig_all" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        m12 => "m12",
        m21 => "m21",
        m13 => "m13",
        m31 => "m31",
        m23 => "m23",
        m32 => "m32",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitAsymMigAll {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::AsymmetricAll,
            &[self.m12, self.m13, self.m21, self.m23, self.m31, self.m32],
            self.t1,
        )?)
    }
}

model_params! {
    /// Sequential split; gene flow only in the ancestral epoch.
    SplitNoMig = "split_nomig" {
        nu1 => "nu1",
        nu_a => "nuA",
        nu2 => "nu2",
        nu3 => "nu3",
        m_a => "mA",
        t1 => "T1",
        t2 => "T2",
    }
}

impl DemographicModel for SplitNoMig {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        sequential(
            self.nu1,
            self.nu_a,
            self.m_a,
            self.t1,
            Epoch::isolated(vec![self.nu1, self.nu2, self.nu3], self.t2),
        )
    }
}

model_params! {
    /// Sequential split, symmetric gene flow between every pair afterwards.
    SplitSymMigAll = "split_sym_mig_all" {
        nu1 => "nu1",
        nu_a => "nuA",
        nu2 => "nu2",
        nu3 => "nu3",
        m_a => "mA",
        m12 => "m12",
        m23 => "m23",
        m13 => "m13",
        t1 => "T1",
        t2 => "T2",
    }
}

impl DemographicModel for SplitSymMigAll {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::SymmetricAll,
            &[self.m12, self.m13, self.m23],
            self.t2,
        )?;
        sequential(self.nu1, self.nu_a, self.m_a, self.t1, last)
    }
}

model_params! {
    /// Sequential split, asymmetric gene flow between every pair afterwards.
    SplitAsymMigAll = "split_asym_mig_all" {
        nu1 => "nu1",
        nu_a => "nuA",
        nu2 => "nu2",
        nu3 => "nu3",
        m_a => "mA",
        m12 => "m12",
        m13 => "m13",
        m21 => "m21",
        m23 => "m23",
        m31 => "m31",
        m32 => "m32",
        t1 => "T1",
        t2 => "T2",
    }
}

impl DemographicModel for SplitAsymMigAll {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::AsymmetricAll,
            &[self.m12, self.m13, self.m21, self.m23, self.m31, self.m32],
            self.t2,
        )?;
        sequential(self.nu1, self.nu_a, self.m_a, self.t1, last)
    }
}

model_params! {
    /// Sequential split with population 2 between 1 and 3.
    ///
    /// After the second split only 2 and 3 exchange migrants; 1 and 2 stay
    /// isolated even though they are neighbors.
    SplitSymMigAdjacent = "split_symmig_adjacent" {
        nu1 => "nu1",
        nu_a => "nuA",
        nu2 => "nu2",
        nu3 => "nu3",
        m_a => "mA",
        m23 => "m23",
        t1 => "T1",
        t2 => "T2",
    }
}

impl DemographicModel for SplitSymMigAdjacent {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::SymmetricAdjacent,
            &[0.0, self.m23],
            self.t2,
        )?;
        sequential(self.nu1, self.nu_a, self.m_a, self.t1, last)
    }
}

model_params! {
    /// Asymmetric counterpart of [`SplitSymMigAdjacent`].
    SplitAsymMigAdjacent = "split_asymmig_adjacent" {
        nu1 => "nu1",
        nu_a => "nuA",
        nu2 => "nu2",
        nu3 => "nu3",
        m_ab => "mAB",
        m23 => "m23",
        m32 => "m32",
        t1 => "T1",
        t2 => "T2",
    }
}

impl DemographicModel for SplitAsymMigAdjacent {
    const POPULATIONS: usize = 3;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3],
            Topology::AsymmetricAdjacent,
            &[0.0, 0.0, self.m23, self.m32],
            self.t2,
        )?;
        sequential(self.nu1, self.nu_a, self.m_ab, self.t1, last)
    }
}
