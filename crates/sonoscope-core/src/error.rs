//! Error types for sonoscope-core.

use thiserror::Error;

/// Error type for audio-source operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid audio source: {0}")]
    InvalidSource(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("audio decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => Error::Io(io),
            other => Error::Decode(other.to_string()),
        }
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
