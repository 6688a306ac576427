use super::EmitError;
use std::path::{Component, Path};

/// Extension of every emitted interchange
pub const OUTPUT_EXTENSION: &str = "x12";

pub struct PathSanitizer;

impl PathSanitizer {
    /// Normalize a source path relative to the source directory into a
    /// forward-slash virtual path.
    ///
    /// Rejects:
    /// - absolute paths
    /// - parent directory traversal (`..`)
    /// - paths with no components left
    pub fn virtual_path(relative: &Path) -> Result<String, EmitError> {
        let mut components = Vec::new();

        for component in relative.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(EmitError::InvalidPath(format!(
                        "Absolute path not allowed: {}",
                        relative.display()
                    )));
                }
                Component::ParentDir => {
                    return Err(EmitError::InvalidPath(format!(
                        "Parent directory traversal not allowed: {}",
                        relative.display()
                    )));
                }
                Component::CurDir => continue,
                Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
            }
        }

        if components.is_empty() {
            return Err(EmitError::InvalidPath(format!(
                "No valid components: {}",
                relative.display()
            )));
        }

        Ok(components.join("/"))
    }

    /// Flatten a value into a single file name component
    ///
    /// Every character outside `[A-Za-z0-9._-]` becomes `_`.
    pub fn component(raw: &str) -> String {
        let flat: String = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        // Never produce a hidden file or an empty name
        let flat = flat.trim_start_matches('.');
        if flat.is_empty() {
            "_".to_string()
        } else {
            flat.to_string()
        }
    }
}

/// Name of the output file for one split unit:
/// `{ST01}_{source}_{control:09}.x12`
pub fn output_file_name(transaction_id: &str, source: &str, control_number: u64) -> String {
    format!(
        "{}_{}_{:09}.{}",
        PathSanitizer::component(transaction_id),
        PathSanitizer::component(source),
        control_number,
        OUTPUT_EXTENSION
    )
}
