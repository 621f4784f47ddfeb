use thiserror::Error;

/// Errors that can occur while emitting, streaming or finalizing a WAV stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WavError {
    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("seek failed: {0}")]
    SeekFailed(String),

    #[error("audio payload of {0} bytes does not fit a 32-bit WAV size field")]
    SizeOverflow(i64),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
