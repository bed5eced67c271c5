use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use salsa_params::{ParamError, ParamSet};
use salsa_results::{plot_results, ResultsError};

use crate::experiment::Experiment;
use crate::runner::{CommandRunner, CommandSpec};
use crate::summary::{RunSummary, Step, StepStatus};
use crate::utils::LogErrUnwrap;

pub const RUN_SUMMARY: &str = "run_summary.toml";

#[derive(Debug)]
pub enum PipelineError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    NotADirectory(PathBuf),
    Params(ParamError),
    Spawn {
        step: Step,
        command: String,
        source: io::Error,
    },
    StepFailed {
        step: Step,
        command: String,
        code: Option<i32>,
    },
    Results(ResultsError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            PipelineError::NotADirectory(path) => {
                write!(f, "{} exists but is not a directory", path.display())
            }
            PipelineError::Params(e) => write!(f, "{}", e),
            PipelineError::Spawn {
                step,
                command,
                source,
            } => write!(f, "{} step: could not start '{}': {}", step, command, source),
            PipelineError::StepFailed {
                step,
                command,
                code: Some(code),
            } => write!(f, "{} step: '{}' exited with code {}", step, command, code),
            PipelineError::StepFailed { step, command, .. } => {
                write!(f, "{} step: '{}' was terminated by a signal", step, command)
            }
            PipelineError::Results(e) => write!(f, "plot step: {}", e),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Io { source, .. } => Some(source),
            PipelineError::Params(e) => Some(e),
            PipelineError::Spawn { source, .. } => Some(source),
            PipelineError::Results(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParamError> for PipelineError {
    fn from(e: ParamError) -> Self {
        PipelineError::Params(e)
    }
}

impl From<ResultsError> for PipelineError {
    fn from(e: ResultsError) -> Self {
        PipelineError::Results(e)
    }
}

/// # Explanation
/// Creates the directory (and all missing parents) if it does not exist. An existing directory is left
/// as it is, including its content.
///
/// # Returns
/// Returns true if the directory was created.
pub fn ensure_output_dir(path: impl AsRef<Path>) -> Result<bool, PipelineError> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(false);
    }
    if path.exists() {
        return Err(PipelineError::NotADirectory(path.to_path_buf()));
    }

    std::fs::create_dir_all(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Created the output directory {}.", path.display());
    Ok(true)
}

/// # Explanation
/// Loads the base parameters, applies the overrides of the experiment and writes the derived parameter
/// file the estimator is started with.
///
/// # Returns
/// Returns the path of the derived parameter file.
pub fn write_derived_params(experiment: &Experiment) -> Result<PathBuf, PipelineError> {
    let mut params = ParamSet::load(&experiment.base_params)?;
    params.apply(&experiment.overrides());

    let path = experiment.derived_params_path();
    params.save(&path)?;
    Ok(path)
}

/// # Explanation
/// The pipeline runs the steps of an experiment one after another: prepare (output directory and
/// derived parameters), configure, build, run and plot. Every step blocks until it is done.
///
/// A failing step stops the pipeline unless the experiment has continue_on_failure set, in which case
/// the failure is logged and recorded in the summary and the next step is started anyway.
pub struct Pipeline<R> {
    experiment: Experiment,
    runner: R,
    prepare: bool,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(experiment: Experiment, runner: R) -> Self {
        Pipeline {
            experiment,
            runner,
            prepare: true,
        }
    }

    /// Without the prepare step the derived parameters of an earlier run are used as they are.
    pub fn with_prepare(mut self, prepare: bool) -> Self {
        self.prepare = prepare;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn configure_command(&self) -> CommandSpec {
        let build = &self.experiment.build;
        CommandSpec::new("cmake")
            .arg(build.source_dir.to_string_lossy())
            .arg(format!("-DCMAKE_BUILD_TYPE={}", build.build_type))
            .arg(format!("-G{}", build.generator))
            .args(build.cmake_args.iter().cloned())
            .current_dir(&build.dir)
    }

    pub fn build_command(&self) -> CommandSpec {
        let build = &self.experiment.build;
        let command = if build.generator == "Ninja" {
            CommandSpec::new("ninja").arg(build.target.clone())
        } else {
            CommandSpec::new("cmake").args(["--build", ".", "--target", build.target.as_str()])
        };
        command.current_dir(&build.dir)
    }

    /// The estimator is started in the build directory, the parameter path is absolute.
    pub fn run_command(&self) -> CommandSpec {
        let params_path = self.experiment.derived_params_path();

        CommandSpec::new(self.experiment.binary().to_string_lossy())
            .arg("-f")
            .arg(params_path.to_string_lossy())
            .args(self.experiment.run.extra_args.iter().cloned())
            .current_dir(&self.experiment.build.dir)
    }

    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::new(self.experiment.name.clone());
        log::info!("Starting the experiment {}.", self.experiment.name);

        let result = self.run_steps(&mut summary);
        summary.finish();

        let output_dir = self.experiment.output_dir();
        if output_dir.is_dir() {
            summary.save(output_dir.join(RUN_SUMMARY)).log_err_unwrap(());
        }

        result.map(|_| summary)
    }

    fn run_steps(&mut self, summary: &mut RunSummary) -> Result<(), PipelineError> {
        let started = Utc::now();
        if self.prepare {
            // Errors while preparing always stop the run, there is nothing to run without parameters.
            if let Err(e) = self.prepare() {
                summary.record(Step::Prepare, StepStatus::Failed, Some(e.to_string()), started);
                return Err(e);
            }
            summary.record(Step::Prepare, StepStatus::Succeeded, None, started);
        } else {
            summary.record(Step::Prepare, StepStatus::Skipped, None, started);
        }

        let skip_build = self.experiment.build.skip;
        self.command_step(summary, Step::Configure, skip_build, Self::configure_command)?;
        self.command_step(summary, Step::Build, skip_build, Self::build_command)?;
        let skip_run = self.experiment.run.skip;
        self.command_step(summary, Step::Run, skip_run, Self::run_command)?;

        let started = Utc::now();
        if !self.experiment.plot.enabled {
            summary.record(Step::Plot, StepStatus::Skipped, None, started);
            return Ok(());
        }
        let plotted = plot_results(
            self.experiment.output_dir(),
            &self.experiment.prefix,
            &self.experiment.plot.to_options(),
        );
        match plotted {
            Ok(files) => {
                log::info!("Wrote {} result files.", files.len());
                summary.record(Step::Plot, StepStatus::Succeeded, None, started);
                Ok(())
            }
            Err(e) => self.step_failed(summary, Step::Plot, e.into(), started),
        }
    }

    fn prepare(&self) -> Result<(), PipelineError> {
        ensure_output_dir(self.experiment.log_dir())?;
        let params_path = write_derived_params(&self.experiment)?;
        log::info!("The estimator will read {}.", params_path.display());
        Ok(())
    }

    fn command_step(
        &mut self,
        summary: &mut RunSummary,
        step: Step,
        skip: bool,
        command: fn(&Self) -> CommandSpec,
    ) -> Result<(), PipelineError> {
        let started = Utc::now();
        if skip {
            log::info!("Skipping the {} step.", step);
            summary.record(step, StepStatus::Skipped, None, started);
            return Ok(());
        }

        let command = command(self);
        let error = match self.runner.run(&command) {
            Ok(status) if status.success => {
                summary.record(step, StepStatus::Succeeded, None, started);
                return Ok(());
            }
            Ok(status) => PipelineError::StepFailed {
                step,
                command: command.to_string(),
                code: status.code,
            },
            Err(source) => PipelineError::Spawn {
                step,
                command: command.to_string(),
                source,
            },
        };
        self.step_failed(summary, step, error, started)
    }

    fn step_failed(
        &self,
        summary: &mut RunSummary,
        step: Step,
        error: PipelineError,
        started: chrono::DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        summary.record(step, StepStatus::Failed, Some(error.to_string()), started);
        if self.experiment.continue_on_failure {
            log::warn!("{} (continuing)", error);
            Ok(())
        } else {
            Err(error)
        }
    }
}
