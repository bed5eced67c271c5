pub use crate::experiment::Experiment;
pub use crate::pipeline::{ensure_output_dir, write_derived_params, Pipeline, PipelineError};
pub use crate::runner::{CommandRunner, CommandSpec, DryRunner, ExitStatusInfo, SystemRunner};
pub use crate::summary::{RunSummary, Step, StepStatus};

pub mod experiment;
pub mod pipeline;
pub mod runner;
pub mod summary;
pub mod utils;
