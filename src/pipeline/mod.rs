pub mod controller;
pub mod state;

pub use controller::{PipelineController, PipelineOutcome};
pub use state::PipelineState;
