//! Error types for audiochunk.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during chunking operations.
///
/// Every variant is fatal for the chunker that produced it: the session
/// latches the error and replays it on every later pull. The type is
/// `Clone` so the replay is exact.
#[derive(Debug, Clone, Error)]
pub enum ChunkError {
    /// An I/O error occurred while reading input data.
    #[error("io error: {0}")]
    Io(#[source] Arc<std::io::Error>),

    /// The input is not the expected container or stream format.
    #[error("invalid format: {message}")]
    InvalidFormat {
        /// Description of what was wrong.
        message: &'static str,
    },

    /// The requested WAV output mode is not known.
    #[error("unknown output mode: {0:?}")]
    UnknownMode(String),

    /// The input ended inside a structure that had to be read completely.
    #[error("truncated input: {context} needs {expected} bytes, got {actual}")]
    TruncatedInput {
        /// What was being read.
        context: &'static str,
        /// Bytes required.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A size field in the input exceeds a configured safety bound.
    #[error("resource limit exceeded: {context} declares {declared} bytes (limit {limit})")]
    ResourceLimit {
        /// What declared the size.
        context: &'static str,
        /// The declared size.
        declared: u64,
        /// The configured bound.
        limit: u64,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

/// Coarse classification of a [`ChunkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad signature, missing frame/data chunk or unknown mode.
    Format,
    /// Short read on a header, chunk payload or frame body.
    Truncated,
    /// Declared size over a safety bound.
    ResourceLimit,
    /// Rejected configuration.
    Config,
    /// Failure of the underlying reader.
    Io,
}

impl ChunkError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChunkError::Io(_) => ErrorKind::Io,
            ChunkError::InvalidFormat { .. } | ChunkError::UnknownMode(_) => ErrorKind::Format,
            ChunkError::TruncatedInput { .. } => ErrorKind::Truncated,
            ChunkError::ResourceLimit { .. } => ErrorKind::ResourceLimit,
            ChunkError::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn truncated(context: &'static str, expected: usize, actual: usize) -> Self {
        ChunkError::TruncatedInput {
            context,
            expected,
            actual,
        }
    }
}

impl From<std::io::Error> for ChunkError {
    fn from(e: std::io::Error) -> Self {
        ChunkError::Io(Arc::new(e))
    }
}
