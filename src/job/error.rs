use crate::config::ConfigError;
use crate::emitter::EmitError;
use crate::envelope::EnvelopeError;
use crate::splitter::SplitError;
use crate::x12::ParseError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure confined to one source file
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to read file: {0}")]
    Read(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job has already been started")]
    AlreadyStarted,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Source directory '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Invalid destination '{}': {reason}", .path.display())]
    Destination { path: PathBuf, reason: String },

    #[error("Failed to list source files: {0}")]
    Scan(String),

    #[error("Failed to process {path}: {error}")]
    Malformed {
        path: String,
        #[source]
        error: FileError,
    },

    #[error(transparent)]
    Write(#[from] EmitError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(io::Error),
}
