use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use salsa_experiment::utils::{log_level, logger_init, LOG_FILE};
use salsa_experiment::experiment::RunFlags;
use salsa_experiment::{DryRunner, Experiment, Pipeline, RunSummary, StepStatus, SystemRunner};

/// Builds the estimator, runs it on a recorded dataset with derived parameters and plots the results.
#[derive(Parser, Debug)]
#[command(name = "salsa-experiment", version)]
struct Cli {
    /// Experiment description (toml). Without it the MocapFeatHardware experiment is run.
    #[arg(short, long, value_name = "FILE")]
    experiment: Option<PathBuf>,

    /// Additional parameter override, applied after the ones of the experiment.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    #[arg(long)]
    skip_build: bool,

    #[arg(long)]
    skip_run: bool,

    #[arg(long)]
    no_plot: bool,

    /// Only plot the results of an earlier run.
    #[arg(long, conflicts_with_all = ["skip_build", "skip_run", "no_plot"])]
    plot_only: bool,

    /// Keep going when a step fails.
    #[arg(long)]
    keep_going: bool,

    /// Print the commands instead of running them. The derived parameters are still written.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn experiment(&self) -> Result<Experiment, Box<dyn Error>> {
        let mut experiment = match &self.experiment {
            Some(path) => Experiment::load(path)?,
            None => Experiment::mocap_feat_hardware(),
        };
        experiment.add_assignments(self.set.as_slice())?;
        experiment.apply_flags(&RunFlags {
            skip_build: self.skip_build,
            skip_run: self.skip_run,
            no_plot: self.no_plot,
            plot_only: self.plot_only,
            keep_going: self.keep_going,
            dry_run: self.dry_run,
        });
        Ok(experiment)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let experiment = cli.experiment()?;

    let level = log_level(&experiment.log_level);
    if let Err(e) = logger_init(level, &experiment.output_dir().join(LOG_FILE)) {
        eprintln!("Logging initialization error: {}", e);
    }
    log::info!("Experiment {} started", experiment.name);

    let result = run(&cli, experiment);
    match result {
        Err(e) => {
            log::error!("{}", e);
            Err(e)
        }
        Ok(summary) => {
            print_summary(&summary);
            log::info!("The experiment terminated successfully.");
            Ok(())
        }
    }
}

fn run(cli: &Cli, experiment: Experiment) -> Result<RunSummary, Box<dyn Error>> {
    let summary = if cli.dry_run {
        Pipeline::new(experiment, DryRunner)
            .with_prepare(!cli.plot_only)
            .run()?
    } else {
        Pipeline::new(experiment, SystemRunner)
            .with_prepare(!cli.plot_only)
            .run()?
    };
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    for record in &summary.steps {
        let status = match record.status {
            StepStatus::Succeeded => "ok",
            StepStatus::Failed => "FAILED",
            StepStatus::Skipped => "skipped",
        };
        println!("{:>10}  {:<8} {:>8.1}s", record.step, status, record.seconds);
    }
}
