use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::{Deserialize, Serialize};

use salsa_params::{toml_to_yaml, Overrides, ParamError};
use salsa_results::PlotOptions;

/// # Explanation
/// The description of one estimator run: where the output goes, which base parameters are used and
/// which of them are overridden, how the estimator is built and how the results are plotted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub directory: PathBuf,
    pub prefix: String,
    pub base_params: PathBuf,
    #[serde(default = "default_derived_params")]
    pub derived_params: String,
    #[serde(default)]
    pub continue_on_failure: bool,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub overrides: toml::Table,
    /// Overrides given on the command line, applied after the ones of the file.
    #[serde(skip)]
    pub extra_overrides: Overrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub dir: PathBuf,
    pub source_dir: PathBuf,
    pub generator: String,
    pub build_type: String,
    pub cmake_args: Vec<String>,
    pub target: String,
    pub skip: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            dir: PathBuf::from("../build"),
            source_dir: PathBuf::from(".."),
            generator: "Ninja".to_string(),
            build_type: "RelWithDebInfo".to_string(),
            cmake_args: vec!["-DBUILD_ROS=ON".to_string()],
            target: "salsa_rosbag".to_string(),
            skip: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Path of the estimator relative to the build directory. Defaults to `./<target>`.
    pub binary: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub skip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub plot_truth: bool,
    pub output_dir: PathBuf,
    pub export_csv: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            enabled: true,
            plot_truth: false,
            output_dir: PathBuf::from("plots"),
            export_csv: true,
        }
    }
}

impl PlotConfig {
    pub fn to_options(&self) -> PlotOptions {
        PlotOptions {
            plot_truth: self.plot_truth,
            output_dir: self.output_dir.clone(),
            export_csv: self.export_csv,
            ..PlotOptions::default()
        }
    }
}

/// Switches given on the command line that change which steps of an experiment run.
#[derive(Debug, Copy, Clone, Default)]
pub struct RunFlags {
    pub skip_build: bool,
    pub skip_run: bool,
    pub no_plot: bool,
    /// Only plot the results of an earlier run.
    pub plot_only: bool,
    pub keep_going: bool,
    /// Nothing is executed and so there is nothing to plot.
    pub dry_run: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_derived_params() -> String {
    "tmp.yaml".to_string()
}

#[derive(Debug)]
pub enum ExperimentError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ExperimentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExperimentError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ExperimentError::Parse(e) => write!(f, "invalid experiment description: {}", e),
            ExperimentError::Invalid(msg) => write!(f, "invalid experiment: {}", msg),
        }
    }
}

impl Error for ExperimentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExperimentError::Io { source, .. } => Some(source),
            ExperimentError::Parse(e) => Some(e),
            ExperimentError::Invalid(_) => None,
        }
    }
}

impl Experiment {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ExperimentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ExperimentError> {
        let experiment: Experiment = toml::from_str(content).map_err(ExperimentError::Parse)?;
        experiment.validate()?;
        Ok(experiment)
    }

    /// # Explanation
    /// The hardware run on the mocap dataset: vision updates on, mocap only used for the static start
    /// detection, 100 seconds of the fifth recording.
    pub fn mocap_feat_hardware() -> Self {
        let mut overrides = toml::Table::new();
        let mut set = |key: &str, value: toml::Value| {
            overrides.insert(key.to_string(), value);
        };
        set(
            "bag_name",
            "/home/superjax/rosbag/mynt_mocap_ned/uncompressed/mocap5.bag".into(),
        );
        set("update_on_mocap", true.into());
        set("disable_mocap", true.into());
        set("disable_vision", false.into());
        set("update_on_vision", true.into());
        set("static_start_imu_thresh", 12.into());
        set("start_time", 0.into());
        set(
            "mask_filename",
            "/home/superjax/rosbag/mynt_mocap_ned/mask.png".into(),
        );
        set("duration", 100.into());
        set("enable_static_start", true.into());

        Experiment {
            name: "MocapFeatHardware".to_string(),
            log_level: default_log_level(),
            directory: PathBuf::from("/tmp/Salsa/MocapFeatHardware/"),
            prefix: "Est/".to_string(),
            base_params: PathBuf::from("../params/salsa.yaml"),
            derived_params: default_derived_params(),
            continue_on_failure: false,
            build: BuildConfig::default(),
            run: RunConfig::default(),
            plot: PlotConfig::default(),
            overrides,
            extra_overrides: Overrides::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        let invalid = |msg: &str| Err(ExperimentError::Invalid(msg.to_string()));

        if self.directory.as_os_str().is_empty() {
            return invalid("the output directory is empty");
        }
        if Path::new(&self.prefix).is_absolute() {
            return invalid("the log prefix must be relative to the output directory");
        }
        if self.base_params.as_os_str().is_empty() {
            return invalid("no base parameter file given");
        }
        if self.derived_params.is_empty() {
            return invalid("the derived parameter file name is empty");
        }
        if self.build.target.is_empty() {
            return invalid("the build target is empty");
        }
        Ok(())
    }

    /// # Explanation
    /// The output directory resolved against the current working directory. The estimator runs in the
    /// build directory, so every path handed to it has to be absolute.
    pub fn output_dir(&self) -> PathBuf {
        if self.directory.is_absolute() {
            return self.directory.clone();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&self.directory))
            .unwrap_or_else(|_| self.directory.clone())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.output_dir().join(&self.prefix)
    }

    /// # Explanation
    /// The log directory as the estimator expects it. It glues the names of its log files directly onto
    /// the prefix, so the string always ends with a separator.
    pub fn log_prefix(&self) -> String {
        let mut prefix = self.log_dir().to_string_lossy().into_owned();
        if !prefix.ends_with(MAIN_SEPARATOR) {
            prefix.push(MAIN_SEPARATOR);
        }
        prefix
    }

    pub fn derived_params_path(&self) -> PathBuf {
        self.output_dir().join(&self.derived_params)
    }

    pub fn binary(&self) -> PathBuf {
        self.run
            .binary
            .clone()
            .unwrap_or_else(|| Path::new(".").join(&self.build.target))
    }

    pub fn apply_flags(&mut self, flags: &RunFlags) {
        self.build.skip |= flags.skip_build || flags.plot_only;
        self.run.skip |= flags.skip_run || flags.plot_only;
        self.plot.enabled &= !flags.no_plot && !flags.dry_run;
        self.continue_on_failure |= flags.keep_going;
    }

    /// Parses `key=value` assignments and appends them to the command line overrides.
    pub fn add_assignments<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<(), ParamError> {
        for assignment in assignments {
            let (key, value) = Overrides::parse_assignment(assignment.as_ref())?;
            self.extra_overrides.push(key, value);
        }
        Ok(())
    }

    /// # Explanation
    /// All overrides in the order they are applied: the log prefix first, then the table of the
    /// experiment description and finally the ones from the command line.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new().set("log_prefix", self.log_prefix());
        for (key, value) in &self.overrides {
            overrides.push(key.clone(), toml_to_yaml(value));
        }
        overrides.extend(self.extra_overrides.clone());
        overrides
    }
}
