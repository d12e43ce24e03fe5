use crate::errors::ModelError;
use crate::pipeline::ModelPlan;
use serde::{Deserialize, Serialize};
use splitmig_spectrum::{Engine, Spectrum};

/// Step-size tuning factor applied by [`Tuned`] models.
pub const TUNED_DT_FAC: f64 = 0.01;

/// Named parameter record of one model.
///
/// Field order is the positional order of the flat parameter vector.
pub trait ModelParams: Sized {
    /// Catalog name of the model the record belongs to.
    const NAME: &'static str;
    /// Parameter names in positional order.
    const PARAMETERS: &'static [&'static str];

    /// Unpack a positional vector, failing on any length mismatch.
    fn from_slice(values: &[f64]) -> Result<Self, ModelError>;

    fn to_vec(&self) -> Vec<f64>;
}

/// A demographic history that predicts a joint frequency spectrum.
///
/// Implementors only describe their stages; evaluation is shared.
pub trait DemographicModel: ModelParams {
    /// Number of populations in the returned spectrum.
    const POPULATIONS: usize;

    fn plan(&self) -> Result<ModelPlan, ModelError>;

    fn evaluate<E: Engine + ?Sized>(
        &self,
        ns: &[usize],
        engine: &E,
    ) -> Result<Spectrum, ModelError> {
        self.plan()?.evaluate(ns, engine)
    }
}

/// Wraps a model so that every epoch integrates with [`TUNED_DT_FAC`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuned<M>(pub M);

impl<M: ModelParams> ModelParams for Tuned<M> {
    const NAME: &'static str = M::NAME;
    const PARAMETERS: &'static [&'static str] = M::PARAMETERS;

    fn from_slice(values: &[f64]) -> Result<Self, ModelError> {
        M::from_slice(values).map(Tuned)
    }

    fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl<M: DemographicModel> DemographicModel for Tuned<M> {
    const POPULATIONS: usize = M::POPULATIONS;

    fn plan(&self) -> Result<ModelPlan, ModelError> {
        Ok(self.0.plan()?.with_dt_fac(TUNED_DT_FAC))
    }
}
