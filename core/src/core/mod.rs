pub mod control;
pub mod handler;
pub mod state;
pub mod step;

// Re-export key types for easier access from other modules (and lib.rs)
pub use control::{CatchFlow, Outcome, StepFlow};
pub use handler::{CatchHandler, Failure, StepHandler};
pub use state::State;
pub use step::{Catch, CatchFilter, Step};
