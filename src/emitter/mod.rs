//! Writes split units to the destination directory.

mod archive;
mod error;
mod naming;

#[cfg(test)]
mod tests;

pub use archive::{ClientArchiver, ARCHIVE_DIR};
pub use error::EmitError;
pub use naming::{output_file_name, PathSanitizer, OUTPUT_EXTENSION};

use crate::splitter::SplitUnit;
use crate::x12::charset;
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Suffix of the scratch file a unit is written to before it is renamed
pub const PARTIAL_SUFFIX: &str = ".partial";

/// One file written by the emitter
#[derive(Debug, Clone)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct FileEmitter {
    destination: PathBuf,
    line_breaks: bool,
}

impl FileEmitter {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            line_breaks: false,
        }
    }

    /// Put a newline after every segment terminator
    pub fn line_breaks(mut self, enabled: bool) -> Self {
        self.line_breaks = enabled;
        self
    }

    /// Serialize `unit` and write it under its final name.
    ///
    /// The content goes to a hidden scratch file first and is renamed into
    /// place once fully flushed, so a final name never refers to a partial
    /// file. An existing file with the final name is left untouched; a stale
    /// scratch file from an interrupted run is replaced.
    pub fn emit(&self, unit: &SplitUnit, source: &str) -> Result<EmittedFile, EmitError> {
        let file_name = output_file_name(unit.transaction_id(), source, unit.control_number);
        let path = self.destination.join(&file_name);
        if path.exists() {
            return Err(EmitError::AlreadyExists(path));
        }

        let bytes = charset::encode(&unit.render(self.line_breaks));
        let scratch = self
            .destination
            .join(format!(".{}{}", file_name, PARTIAL_SUFFIX));

        clear_stale(&scratch)?;
        write_new(&scratch, &bytes)?;
        if let Err(e) = fs::rename(&scratch, &path) {
            discard(&scratch);
            return Err(EmitError::io(&path, e));
        }

        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(EmittedFile {
            path,
            file_name,
            bytes,
        })
    }
}

/// Remove a scratch file left behind by an interrupted run
fn clear_stale(scratch: &Path) -> Result<(), EmitError> {
    match fs::remove_file(scratch) {
        Ok(()) => {
            warn!("Replaced stale scratch file {}", scratch.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EmitError::io(scratch, e)),
    }
}

/// Create `path` exclusively and fill it; a file created here is removed
/// again when writing fails.
fn write_new(path: &Path, bytes: &[u8]) -> Result<(), EmitError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| EmitError::io(path, e))?;

    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written {
        discard(path);
        return Err(EmitError::io(path, e));
    }
    Ok(())
}

fn discard(scratch: &Path) {
    if let Err(e) = fs::remove_file(scratch) {
        warn!("Failed to remove scratch file {}: {}", scratch.display(), e);
    }
}
