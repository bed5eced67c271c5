use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ResultsError {
    Io { path: PathBuf, source: io::Error },
    MissingLog(PathBuf),
    TruncatedLog { len: usize, record_size: usize },
    Csv(csv::Error),
    Plot(String),
}

impl Display for ResultsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultsError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ResultsError::MissingLog(path) => {
                write!(f, "the log {} does not exist", path.display())
            }
            ResultsError::TruncatedLog { len, record_size } => write!(
                f,
                "the log has {} bytes which is not a multiple of the record size {}",
                len, record_size
            ),
            ResultsError::Csv(e) => write!(f, "csv export failed: {}", e),
            ResultsError::Plot(msg) => write!(f, "plotting failed: {}", msg),
        }
    }
}

impl Error for ResultsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResultsError::Io { source, .. } => Some(source),
            ResultsError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for ResultsError {
    fn from(e: csv::Error) -> Self {
        ResultsError::Csv(e)
    }
}
