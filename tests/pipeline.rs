use std::io;
use std::path::Path;

use salsa_experiment::{
    CommandRunner, CommandSpec, ExitStatusInfo, Experiment, Pipeline, PipelineError, Step,
    StepStatus,
};
use salsa_params::{ParamSet, ParamValue};

struct MockRunner {
    commands: Vec<CommandSpec>,
    failing_program: Option<&'static str>,
}

impl MockRunner {
    fn new() -> Self {
        MockRunner {
            commands: Vec::new(),
            failing_program: None,
        }
    }

    fn failing(program: &'static str) -> Self {
        MockRunner {
            commands: Vec::new(),
            failing_program: Some(program),
        }
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, command: &CommandSpec) -> io::Result<ExitStatusInfo> {
        self.commands.push(command.clone());
        if self.failing_program == Some(command.program.as_str()) {
            Ok(ExitStatusInfo::failure(Some(1)))
        } else {
            Ok(ExitStatusInfo::success())
        }
    }
}

fn experiment_in(dir: &Path) -> Experiment {
    let base_params = dir.join("salsa.yaml");
    std::fs::write(
        &base_params,
        "bag_name: base.bag\nlog_prefix: /tmp/\nduration: 1000\ndisable_vision: true\n",
    )
    .unwrap();

    let content = format!(
        r#"
name = "Test"
directory = "{}"
prefix = "Est/"
base_params = "{}"

[build]
dir = "{}"

[plot]
enabled = false

[overrides]
bag_name = "mocap5.bag"
disable_vision = false
duration = 100
"#,
        dir.join("out").display(),
        base_params.display(),
        dir.join("build").display(),
    );
    Experiment::from_toml_str(&content).unwrap()
}

#[test]
fn test_steps_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = experiment_in(dir.path());
    let build_dir = dir.path().join("build");

    let mut pipeline = Pipeline::new(experiment, MockRunner::new());
    let summary = pipeline.run().unwrap();

    let commands = &pipeline.runner().commands;
    assert_eq!(commands.len(), 3);

    assert_eq!(commands[0].program, "cmake");
    assert_eq!(
        commands[0].args,
        vec![
            "..",
            "-DCMAKE_BUILD_TYPE=RelWithDebInfo",
            "-GNinja",
            "-DBUILD_ROS=ON"
        ]
    );
    assert_eq!(commands[1].program, "ninja");
    assert_eq!(commands[1].args, vec!["salsa_rosbag"]);

    let params_path = dir.path().join("out").join("tmp.yaml");
    assert_eq!(commands[2].program, "./salsa_rosbag");
    assert_eq!(
        commands[2].args,
        vec!["-f".to_string(), params_path.to_string_lossy().into_owned()]
    );
    for command in commands {
        assert_eq!(command.current_dir.as_deref(), Some(build_dir.as_path()));
    }

    assert!(summary.succeeded());
    assert_eq!(summary.status_of(Step::Plot), Some(StepStatus::Skipped));
    assert!(dir.path().join("out").join("run_summary.toml").exists());
}

#[test]
fn test_prepare_writes_derived_params() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = experiment_in(dir.path());

    let mut pipeline = Pipeline::new(experiment, MockRunner::new());
    pipeline.run().unwrap();

    assert!(dir.path().join("out").join("Est").is_dir());

    let derived = ParamSet::load(dir.path().join("out").join("tmp.yaml")).unwrap();
    let log_prefix = format!("{}/", dir.path().join("out").join("Est").display());
    assert_eq!(
        derived.keys().collect::<Vec<_>>(),
        vec!["bag_name", "log_prefix", "duration", "disable_vision"]
    );
    assert_eq!(
        derived.get("bag_name"),
        Some(&ParamValue::from("mocap5.bag"))
    );
    assert_eq!(
        derived.get("log_prefix"),
        Some(&ParamValue::from(log_prefix))
    );
    assert_eq!(derived.get("duration"), Some(&ParamValue::from(100)));
    assert_eq!(derived.get("disable_vision"), Some(&ParamValue::from(false)));
}

#[test]
fn test_failure_stops_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = experiment_in(dir.path());

    let mut pipeline = Pipeline::new(experiment, MockRunner::failing("ninja"));
    let result = pipeline.run();

    assert!(matches!(
        result,
        Err(PipelineError::StepFailed {
            step: Step::Build,
            code: Some(1),
            ..
        })
    ));
    // the estimator was not started
    assert_eq!(pipeline.runner().commands.len(), 2);

    let summary = std::fs::read_to_string(dir.path().join("out").join("run_summary.toml")).unwrap();
    assert!(summary.contains("status = \"failed\""));
}

#[test]
fn test_continue_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut experiment = experiment_in(dir.path());
    experiment.continue_on_failure = true;
    // there is no state log, so plotting fails as well
    experiment.plot.enabled = true;

    let mut pipeline = Pipeline::new(experiment, MockRunner::failing("ninja"));
    let summary = pipeline.run().unwrap();

    assert_eq!(pipeline.runner().commands.len(), 3);
    assert_eq!(summary.status_of(Step::Build), Some(StepStatus::Failed));
    assert_eq!(summary.status_of(Step::Run), Some(StepStatus::Succeeded));
    assert_eq!(summary.status_of(Step::Plot), Some(StepStatus::Failed));
    assert!(!summary.succeeded());
}

#[test]
fn test_missing_base_params() {
    let dir = tempfile::tempdir().unwrap();
    let mut experiment = experiment_in(dir.path());
    experiment.base_params = dir.path().join("missing.yaml");
    experiment.continue_on_failure = true;

    let mut pipeline = Pipeline::new(experiment, MockRunner::new());

    assert!(matches!(pipeline.run(), Err(PipelineError::Params(_))));
    assert!(pipeline.runner().commands.is_empty());
}

#[test]
fn test_skips() {
    let dir = tempfile::tempdir().unwrap();
    let mut experiment = experiment_in(dir.path());
    experiment.build.skip = true;
    experiment.build.generator = "Unix Makefiles".to_string();

    let mut pipeline = Pipeline::new(experiment, MockRunner::new());
    let summary = pipeline.run().unwrap();

    let commands = &pipeline.runner().commands;
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].program, "./salsa_rosbag");
    assert_eq!(summary.status_of(Step::Configure), Some(StepStatus::Skipped));
    assert_eq!(summary.status_of(Step::Build), Some(StepStatus::Skipped));

    let build = pipeline.build_command();
    assert_eq!(build.program, "cmake");
    assert_eq!(build.args, vec!["--build", ".", "--target", "salsa_rosbag"]);
}

#[test]
fn test_relative_directory_reaches_the_estimator_absolute() {
    let content = r#"
name = "Relative"
directory = "out"
prefix = "Est/"
base_params = "salsa.yaml"

[build]
dir = "../build"
"#;
    let experiment = Experiment::from_toml_str(content).unwrap();
    let cwd = std::env::current_dir().unwrap();
    let log_prefix = match experiment.overrides().iter().next() {
        Some(("log_prefix", ParamValue::String(prefix))) => prefix.clone(),
        other => panic!("log_prefix is not the first override: {:?}", other),
    };

    let pipeline = Pipeline::new(experiment, MockRunner::new());
    let run = pipeline.run_command();

    // the estimator runs in ../build, so both paths must not depend on its working directory
    assert_eq!(run.current_dir.as_deref(), Some(Path::new("../build")));
    assert!(Path::new(&log_prefix).is_absolute());
    assert_eq!(log_prefix, format!("{}/", cwd.join("out").join("Est").display()));
    assert_eq!(run.args[1], cwd.join("out").join("tmp.yaml").to_string_lossy());
}
