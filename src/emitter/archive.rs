use super::{EmitError, PathSanitizer};
use crate::client::Client;
use chrono::{Datelike, Timelike};
use log::info;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Subdirectory of the destination holding the per-client archives
pub const ARCHIVE_DIR: &str = "archives";

/// Bundles emitted units into one deflate ZIP per client.
///
/// Archives are opened on first use and stay open until [`finish`] so every
/// unit of a client lands in the same file regardless of source order.
/// Distinct ids that flatten to the same file name get a numeric suffix.
///
/// [`finish`]: ClientArchiver::finish
pub struct ClientArchiver {
    root: PathBuf,
    archives: HashMap<String, (PathBuf, ZipWriter<File>)>,
    file_stems: HashSet<String>,
}

impl ClientArchiver {
    pub fn new(destination: &Path) -> Self {
        Self {
            root: destination.join(ARCHIVE_DIR),
            archives: HashMap::new(),
            file_stems: HashSet::new(),
        }
    }

    /// Add `bytes` as `entry_name` to the archive of `client`
    pub fn add(&mut self, client: &Client, entry_name: &str, bytes: &[u8]) -> Result<(), EmitError> {
        if !self.archives.contains_key(&client.id) {
            let path = self.open_path(client)?;
            let file = File::create(&path).map_err(|e| EmitError::io(&path, e))?;
            info!("Opened archive {} for {}", path.display(), client);
            self.archives
                .insert(client.id.clone(), (path, ZipWriter::new(file)));
        }

        let Some((path, zip)) = self.archives.get_mut(&client.id) else {
            return Ok(());
        };

        let now = chrono::Local::now();
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644)
            .last_modified_time(
                zip::DateTime::from_date_and_time(
                    now.year() as u16,
                    now.month() as u8,
                    now.day() as u8,
                    now.hour() as u8,
                    now.minute() as u8,
                    now.second() as u8,
                )
                .unwrap_or_default(),
            );

        zip.start_file(entry_name, options)
            .map_err(|e| EmitError::Archive {
                path: path.clone(),
                message: e.to_string(),
            })?;
        zip.write_all(bytes).map_err(|e| EmitError::io(path.as_path(), e))?;
        Ok(())
    }

    /// Finalize every archive, returning their paths
    pub fn finish(self) -> Result<Vec<PathBuf>, EmitError> {
        let mut paths = Vec::with_capacity(self.archives.len());
        for (_, (path, zip)) in self.archives {
            zip.finish().map_err(|e| EmitError::Archive {
                path: path.clone(),
                message: e.to_string(),
            })?;
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    fn open_path(&mut self, client: &Client) -> Result<PathBuf, EmitError> {
        fs::create_dir_all(&self.root).map_err(|e| EmitError::io(&self.root, e))?;

        let base = PathSanitizer::component(&client.id);
        let mut stem = base.clone();
        let mut suffix = 2;
        while self.file_stems.contains(&stem) {
            stem = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let path = self.root.join(format!("{}.zip", stem));
        if path.exists() {
            return Err(EmitError::AlreadyExists(path));
        }
        self.file_stems.insert(stem);
        Ok(path)
    }
}
