mod closure;
mod moments;
mod recording;

pub use moments::{MomentEngine, DEFAULT_DT_FAC};
pub use recording::{EngineCall, RecordingEngine};
