use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A table does not have the shape a stage expects
    #[error("{}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    #[error("invalid thresholds file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Error {
    pub fn format<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Error {
        Error::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
