//! Catalog of three- and four-population split/migration models.
//!
//! Each model maps a positional parameter vector and per-population sample
//! sizes to the expected joint allele-frequency spectrum. Models are
//! declarative [`ModelPlan`]s of splits and integration epochs, evaluated
//! against any [`Engine`](splitmig_spectrum::Engine).

pub mod batch;
pub mod catalog;
pub mod errors;
pub mod pipeline;
pub mod prelude;
mod traits;

pub use batch::evaluate_batch;
pub use catalog::{find_model, Catalog, ModelEntry};
pub use errors::ModelError;
pub use pipeline::{Epoch, ModelPlan, PlanBuilder, SplitSpec, Stage};
pub use traits::{DemographicModel, ModelParams, Tuned, TUNED_DT_FAC};
