pub use crate::error::ResultsError;
pub use crate::plot::{plot_results, PlotOptions};
pub use crate::state_log::{StateLog, StateRecord};

pub mod error;
pub mod export;
pub mod plot;
pub mod state_log;

/// Name of the state log the estimator writes below its log prefix.
pub const STATE_LOG: &str = "State.log";
/// Name of the ground truth log (only written by simulations), directly in the output directory.
pub const TRUTH_LOG: &str = "Truth.log";
