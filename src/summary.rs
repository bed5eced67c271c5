use std::error::Error;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Prepare,
    Configure,
    Build,
    Run,
    Plot,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Prepare => "prepare",
            Step::Configure => "configure",
            Step::Build => "build",
            Step::Run => "run",
            Step::Plot => "plot",
        };
        f.pad(name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub seconds: f64,
}

/// # Explanation
/// What happened during a run. It is written next to the derived parameters so that a run can be
/// judged afterwards without the terminal output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub experiment: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
}

impl RunSummary {
    pub fn new(experiment: impl Into<String>) -> Self {
        RunSummary {
            experiment: experiment.into(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        step: Step,
        status: StepStatus,
        message: Option<String>,
        started: DateTime<Utc>,
    ) {
        let seconds = (Utc::now() - started).num_milliseconds() as f64 / 1000.0;
        self.steps.push(StepRecord {
            step,
            status,
            message,
            seconds,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn status_of(&self, step: Step) -> Option<StepStatus> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| record.status)
    }

    pub fn succeeded(&self) -> bool {
        self.steps
            .iter()
            .all(|record| record.status != StepStatus::Failed)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let content = toml::to_string(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
