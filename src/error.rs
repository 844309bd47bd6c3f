use std::io;

use thiserror::Error;

/// Every failure the decode and analysis core can report.
#[derive(Debug, Error)]
pub enum SpectrError {
    /// Malformed or unsupported bitstream, bad window geometry, PCM length mismatch.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The external codec failed.
    #[error("codec library error: {0}")]
    Library(String),
}

impl SpectrError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SpectrError::InvalidInput(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        SpectrError::Io(io::Error::new(io::ErrorKind::InvalidData, msg.into()))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SpectrError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, SpectrError>;

/// Allocate a zero-length vector with room for `len` elements, reporting
/// allocation failure instead of aborting.
pub(crate) fn try_vec_with_capacity<T>(len: usize, what: &str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|e| SpectrError::OutOfMemory(format!("{} ({} elements): {}", what, len, e)))?;
    Ok(v)
}
