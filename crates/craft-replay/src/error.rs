use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Errors that stop a replay run.
#[derive(Error, Debug)]
pub enum Error {
    /// The message file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Input {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Bridge or sidebar configuration was rejected.
    #[error(transparent)]
    Bridge(#[from] craft_bridge::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = StdResult<T, Error>;
