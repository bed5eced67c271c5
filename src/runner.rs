use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// # Explanation
/// An external program together with its arguments and the directory it is started in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(dir) = &self.current_dir {
            write!(f, "(cd {}) ", dir.display())?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExitStatusInfo {
    pub success: bool,
    /// None if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitStatusInfo {
    pub fn success() -> Self {
        ExitStatusInfo {
            success: true,
            code: Some(0),
        }
    }

    pub fn failure(code: Option<i32>) -> Self {
        ExitStatusInfo {
            success: false,
            code,
        }
    }
}

/// # Explanation
/// The CommandRunner trait starts an external program and blocks until it has finished.
pub trait CommandRunner {
    fn run(&mut self, command: &CommandSpec) -> io::Result<ExitStatusInfo>;
}

/// # Explanation
/// Runs the commands as child processes. The children share stdin, stdout and stderr with the driver so
/// that the output of cmake, ninja and the estimator shows up in the terminal. There is no timeout.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &CommandSpec) -> io::Result<ExitStatusInfo> {
        log::info!("Running {}", command);

        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }

        let status = process.status()?;
        Ok(ExitStatusInfo {
            success: status.success(),
            code: status.code(),
        })
    }
}

/// # Explanation
/// Only prints the commands. Every command counts as successful.
pub struct DryRunner;

impl CommandRunner for DryRunner {
    fn run(&mut self, command: &CommandSpec) -> io::Result<ExitStatusInfo> {
        log::info!("Dry run: {}", command);
        println!("{}", command);
        Ok(ExitStatusInfo::success())
    }
}

#[cfg(test)]
mod tests {
    use crate::runner::{CommandRunner, CommandSpec, SystemRunner};

    #[test]
    fn test_display() {
        let command = CommandSpec::new("ninja")
            .arg("salsa_rosbag")
            .current_dir("../build");
        assert_eq!(command.to_string(), "(cd ../build) ninja salsa_rosbag");

        let command = CommandSpec::new("./salsa_rosbag").args(["-f", "/tmp/my params.yaml"]);
        assert_eq!(command.to_string(), "./salsa_rosbag -f \"/tmp/my params.yaml\"");
    }

    #[test]
    fn test_missing_program() {
        let command = CommandSpec::new("this-program-does-not-exist-anywhere");
        assert!(SystemRunner.run(&command).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes() {
        let status = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 0"]))
            .unwrap();
        assert!(status.success);

        let status = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]))
            .unwrap();
        assert!(!status.success);
        assert_eq!(status.code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let command = CommandSpec::new("sh")
            .args(["-c", "touch created_here"])
            .current_dir(dir.path());

        assert!(SystemRunner.run(&command).unwrap().success);
        assert!(dir.path().join("created_here").exists());
    }
}
