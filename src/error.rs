use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures raised while reading inputs or writing the report.
///
/// Missing values inside a configuration are never errors; they surface as mismatches.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ValidationError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => ValidationError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ValidationError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
