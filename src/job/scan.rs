use super::JobError;
use crate::emitter::PathSanitizer;
use crate::x12::{self, charset};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file below the source directory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Forward-slash path relative to the source directory
    pub name: String,
    /// ST segments found by the pre-scan
    pub transactions: u64,
}

/// List regular files below `source`, sorted by name, skipping anything
/// inside `exclude` (the destination, when nested in the source).
pub fn collect_sources(source: &Path, exclude: Option<&Path>) -> Result<Vec<SourceFile>, JobError> {
    info!("Scanning source directory: {}", source.display());

    let mut files = Vec::new();
    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| exclude.map_or(true, |dir| !is_within(e.path(), dir)));

    for entry in walker {
        let entry = entry.map_err(|e| JobError::Scan(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(source).unwrap_or(path);
        let name = PathSanitizer::virtual_path(relative)
            .map_err(|e| JobError::Scan(e.to_string()))?;

        files.push(SourceFile {
            path: path.to_path_buf(),
            name,
            transactions: 0,
        });
    }

    info!("Found {} source files", files.len());
    Ok(files)
}

/// Count ST segments in every file; returns the total.
///
/// Unreadable or malformed files count what could be tokenized before the
/// first problem, possibly nothing.
pub fn prescan(files: &mut [SourceFile]) -> u64 {
    let mut total = 0;
    for file in files.iter_mut() {
        file.transactions = match fs::read(&file.path) {
            Ok(bytes) => count_transactions(&charset::decode(&bytes)),
            Err(e) => {
                warn!("Pre-scan could not read {}: {}", file.name, e);
                0
            }
        };
        debug!("Pre-scan {}: {} transactions", file.name, file.transactions);
        total += file.transactions;
    }
    total
}

pub fn count_transactions(text: &str) -> u64 {
    let Ok(segments) = x12::read(text) else {
        return 0;
    };
    segments
        .map_while(Result::ok)
        .filter(|segment| segment.is("ST"))
        .count() as u64
}

fn is_within(path: &Path, dir: &Path) -> bool {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    path.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{interchange, three_remittances};
    use tempfile::TempDir;

    #[test]
    fn test_count_transactions() {
        assert_eq!(count_transactions(&three_remittances()), 3);
        assert_eq!(count_transactions("not an interchange"), 0);
    }

    #[test]
    fn test_count_stops_at_tokenization_error() {
        let text = three_remittances().replacen("ST*835*0002", "*835*0002", 1);
        assert_eq!(count_transactions(&text), 1);
    }

    #[test]
    fn test_collect_sorted_and_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.835"), three_remittances()).unwrap();
        fs::write(dir.path().join("a.837"), interchange(1, "837", &[&["BHT*0019"]])).unwrap();
        fs::write(dir.path().join("nested").join("c.835"), "junk").unwrap();

        let mut files = collect_sources(dir.path(), None).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.837", "b.835", "nested/c.835"]);

        assert_eq!(prescan(&mut files), 4);
        assert_eq!(files[2].transactions, 0);
    }

    #[test]
    fn test_collect_excludes_destination() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(dir.path().join("a.835"), "x").unwrap();
        fs::write(out.join("835_a.835_000000001.x12"), "x").unwrap();

        let canonical = out.canonicalize().unwrap();
        let files = collect_sources(dir.path(), Some(&canonical)).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.835");
    }
}
