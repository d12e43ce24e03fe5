//! Four-population catalog.
//!
//! Barrier models allow gene flow only inside the groups {1, 2} and {3, 4}.
//! Sequential models share a common ancestral history: two ancestral
//! populations A and B exchange migrants at `mAB` for `T1`, a third lineage
//! C appears and the three exchange migrants symmetrically for `T2`, and the
//! last split opens the final epoch of length `T3`.

use super::params::model_params;
use crate::errors::ModelError;
use crate::pipeline::{Epoch, ModelPlan};
use crate::traits::DemographicModel;
use splitmig_spectrum::Topology;

const BARRIER: usize = 2;

fn simultaneous(last: Epoch) -> Result<ModelPlan, ModelError> {
    ModelPlan::builder(4)
        .split()
        .split()
        .split()
        .integrate(last)
        .build()
}

/// Ancestral rates and sizes shared by the sequential models.
struct Ancestry {
    nu_a: f64,
    nu_b: f64,
    nu_c: f64,
    m_ab: f64,
    m_ac: f64,
    m_bc: f64,
    t1: f64,
    t2: f64,
}

impl Ancestry {
    fn plan(&self, last: Epoch) -> Result<ModelPlan, ModelError> {
        let first = Epoch::with_topology(
            vec![self.nu_a, self.nu_b],
            Topology::SymmetricAll,
            &[self.m_ab],
            self.t1,
        )?;
        let second = Epoch::with_topology(
            vec![self.nu_a, self.nu_b, self.nu_c],
            Topology::SymmetricAll,
            &[self.m_ab, self.m_ac, self.m_bc],
            self.t2,
        )?;
        ModelPlan::builder(4)
            .split()
            .integrate(first)
            .split()
            .integrate(second)
            .split()
            .integrate(last)
            .build()
    }
}

macro_rules! ancestry {
    ($params:expr) => {
        Ancestry {
            nu_a: $params.nu_a,
            nu_b: $params.nu_b,
            nu_c: $params.nu_c,
            m_ab: $params.m_ab,
            m_ac: $params.m_ac,
            m_bc: $params.m_bc,
            t1: $params.t1,
            t2: $params.t2,
        }
    };
}

model_params! {
    /// Simultaneous split into four isolated populations.
    SimSplitNoMig4D = "sim_split_nomig_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        nu4 => "nu4",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitNoMig4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::isolated(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            self.t1,
        ))
    }
}

model_params! {
    SimSplitAllSymMig4D = "sim_split_all_sym_mig_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        nu4 => "nu4",
        m12 => "m12",
        m13 => "m13",
        m14 => "m14",
        m23 => "m23",
        m24 => "m24",
        m34 => "m34",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitAllSymMig4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::SymmetricAll,
            &[self.m12, self.m13, self.m14, self.m23, self.m24, self.m34],
            self.t1,
        )?)
    }
}

model_params! {
    SimSplitAllAsymMig4D = "sim_split_all_asym_mig_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        nu4 => "nu4",
        m12 => "m12",
        m13 => "m13",
        m14 => "m14",
        m21 => "m21",
        m23 => "m23",
        m24 => "m24",
        m31 => "m31",
        m32 => "m32",
        m34 => "m34",
        m41 => "m41",
        m42 => "m42",
        m43 => "m43",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitAllAsymMig4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::AsymmetricAll,
            &[
                self.m12, self.m13, self.m14, self.m21, self.m23, self.m24, self.m31, self.m32,
                self.m34, self.m41, self.m42, self.m43,
            ],
            self.t1,
        )?)
    }
}

model_params! {
    /// Simultaneous split; symmetric flow within {1, 2} and within {3, 4}.
    SimSplitSymMigBarrier4D = "sim_split_sym_mig_barrier_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        nu4 => "nu4",
        m12 => "m12",
        m34 => "m34",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitSymMigBarrier4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::SymmetricBarrier { boundary: BARRIER },
            &[self.m12, self.m34],
            self.t1,
        )?)
    }
}

model_params! {
    /// Simultaneous split; asymmetric flow within {1, 2} and within {3, 4}.
    SimSplitAsymMigBarrier4D = "sim_split_asym_mig_barrier_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu3 => "nu3",
        nu4 => "nu4",
        m12 => "m12",
        m21 => "m21",
        m34 => "m34",
        m43 => "m43",
        t1 => "T1",
    }
}

impl DemographicModel for SimSplitAsymMigBarrier4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        simultaneous(Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::AsymmetricBarrier { boundary: BARRIER },
            &[self.m12, self.m21, self.m34, self.m43],
            self.t1,
        )?)
    }
}

model_params! {
    /// Symmetric gene flow between every pair of modern populations.
    SplitSymMig4D = "split_sym_mig_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu_a => "nuA",
        nu3 => "nu3",
        nu_b => "nuB",
        nu4 => "nu4",
        nu_c => "nuC",
        m_ab => "mAB",
        m_ac => "mAC",
        m_bc => "mBC",
        m12 => "m12",
        m13 => "m13",
        m14 => "m14",
        m23 => "m23",
        m24 => "m24",
        m34 => "m34",
        t1 => "T1",
        t2 => "T2",
        t3 => "T3",
    }
}

impl DemographicModel for SplitSymMig4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::SymmetricAll,
            &[self.m12, self.m13, self.m14, self.m23, self.m24, self.m34],
            self.t3,
        )?;
        ancestry!(self).plan(last)
    }
}

model_params! {
    /// Asymmetric gene flow between every pair of modern populations.
    SplitAsymMigAll4D = "split_asym_mig_all_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu_a => "nuA",
        nu3 => "nu3",
        nu_b => "nuB",
        nu4 => "nu4",
        nu_c => "nuC",
        m_ab => "mAB",
        m_ac => "mAC",
        m_bc => "mBC",
        m12 => "m12",
        m13 => "m13",
        m14 => "m14",
        m21 => "m21",
        m23 => "m23",
        m24 => "m24",
        m31 => "m31",
        m32 => "m32",
        m34 => "m34",
        m41 => "m41",
        m42 => "m42",
        m43 => "m43",
        t1 => "T1",
        t2 => "T2",
        t3 => "T3",
    }
}

impl DemographicModel for SplitAsymMigAll4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::AsymmetricAll,
            &[
                self.m12, self.m13, self.m14, self.m21, self.m23, self.m24, self.m31, self.m32,
                self.m34, self.m41, self.m42, self.m43,
            ],
            self.t3,
        )?;
        ancestry!(self).plan(last)
    }
}

model_params! {
    /// No gene flow between modern populations.
    SplitNoMig4D = "split_nomig_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu_a => "nuA",
        nu3 => "nu3",
        nu_b => "nuB",
        nu4 => "nu4",
        nu_c => "nuC",
        m_ab => "mAB",
        m_ac => "mAC",
        m_bc => "mBC",
        t1 => "T1",
        t2 => "T2",
        t3 => "T3",
    }
}

impl DemographicModel for SplitNoMig4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::isolated(vec![self.nu1, self.nu2, self.nu3, self.nu4], self.t3);
        ancestry!(self).plan(last)
    }
}

model_params! {
    /// Symmetric gene flow within {1, 2} and within {3, 4}.
    SplitSymMigBarrier4D = "split_symmig_barrier_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu_a => "nuA",
        nu3 => "nu3",
        nu_b => "nuB",
        nu4 => "nu4",
        nu_c => "nuC",
        m_ab => "mAB",
        m_ac => "mAC",
        m_bc => "mBC",
        m12 => "m12",
        m34 => "m34",
        t1 => "T1",
        t2 => "T2",
        t3 => "T3",
    }
}

impl DemographicModel for SplitSymMigBarrier4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::SymmetricBarrier { boundary: BARRIER },
            &[self.m12, self.m34],
            self.t3,
        )?;
        ancestry!(self).plan(last)
    }
}

model_params! {
    /// Asymmetric gene flow within {1, 2} and within {3, 4}.
    SplitAsymMigBarrier4D = "split_asymmig_barrier_4D" {
        nu1 => "nu1",
        nu2 => "nu2",
        nu_a => "nuA",
        nu3 => "nu3",
        nu_b => "nuB",
        nu4 => "nu4",
        nu_c => "nuC",
        m_ab => "mAB",
        m_ac => "mAC",
        m_bc => "mBC",
        m12 => "m12",
        m21 => "m21",
        m34 => "m34",
        m43 => "m43",
        t1 => "T1",
        t2 => "T2",
        t3 => "T3",
    }
}

impl DemographicModel for SplitAsymMigBarrier4D {
    const POPULATIONS: usize = 4;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        let last = Epoch::with_topology(
            vec![self.nu1, self.nu2, self.nu3, self.nu4],
            Topology::AsymmetricBarrier { boundary: BARRIER },
            &[self.m12, self.m21, self.m34, self.m43],
            self.t3,
        )?;
        ancestry!(self).plan(last)
    }
}
