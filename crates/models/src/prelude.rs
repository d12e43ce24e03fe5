//! Commonly used imports for convenience.
//!
//! ```
//! use splitmig_models::prelude::*;
//!
//! let (_, entry) = find_model("sim_split_no_mig").unwrap();
//! let fs = entry
//!     .evaluate(&[1.0, 1.0, 1.0, 0.1], &[2, 2, 2], &MomentEngine::new())
//!     .unwrap();
//! assert_eq!(fs.sample_sizes(), vec![2, 2, 2]);
//! ```

pub use crate::batch::evaluate_batch;
pub use crate::catalog::{find_model, Catalog, ModelEntry};
pub use crate::errors::ModelError;
pub use crate::pipeline::{Epoch, ModelPlan, Stage};
pub use crate::traits::{DemographicModel, ModelParams, Tuned};
pub use splitmig_spectrum::{Engine, MigrationMatrix, MomentEngine, Spectrum, Topology};
