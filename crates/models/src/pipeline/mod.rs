//! Generic epoch pipeline shared by every catalog model.

mod epoch;
mod plan;

pub use epoch::{Epoch, Stage};
pub use plan::{ModelPlan, PlanBuilder, SplitSpec};
