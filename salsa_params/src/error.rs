use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ParamError {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_yaml::Error),
    NotAMapping,
    InvalidAssignment(String),
}

impl Display for ParamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ParamError::Parse(e) => write!(f, "invalid parameter yaml: {}", e),
            ParamError::NotAMapping => {
                write!(f, "the parameter file must contain a mapping at the top level")
            }
            ParamError::InvalidAssignment(s) => {
                write!(f, "'{}' is not an assignment of the form key=value", s)
            }
        }
    }
}

impl Error for ParamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParamError::Io { source, .. } => Some(source),
            ParamError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for ParamError {
    fn from(e: serde_yaml::Error) -> Self {
        ParamError::Parse(e)
    }
}
