use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Output file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid source path: {0}")]
    InvalidPath(String),

    #[error("Failed to write archive {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },
}

impl EmitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
