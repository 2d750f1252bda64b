//! Error type shared by the splitlog crates.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A key the sink cannot work without is absent from the configuration map.
    #[error("not found {0}")]
    MissingKey(&'static str),

    /// The sink name passed to the registry is neither `file` nor `console`.
    #[error("unsupported sink name: {0}")]
    UnknownSink(String),

    #[error("logger already initialized")]
    AlreadyInitialized,

    /// A log destination could not be opened at startup.
    ///
    /// This error is unrecoverable: the caller is expected to exit the process
    /// when it gets it.
    #[error("open file {} failed: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
