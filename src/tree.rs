//! Expansion of require-tree directives into per-file references.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::stubs::without_leading_relative;

/// Expand a require-tree directive into one reference per contained file.
///
/// The directory is located relative to the file that declared the
/// directive, the way the compiler resolves it at runtime. Only the
/// immediate children count; subdirectories are not descended into. Entries
/// come back sorted by name so generated output does not depend on
/// filesystem enumeration order, each one an identifier joining the
/// directive path to the file name.
pub fn expand(directory: &str, issuing_file: &Path) -> Result<Vec<String>> {
    let canonical = without_leading_relative(directory);
    let base = issuing_file.parent().unwrap_or_else(|| Path::new("."));
    let dir = base.join(canonical);

    let entries = fs::read_dir(&dir).map_err(|source| BridgeError::DirectoryExpansion {
        dir: dir.clone(),
        source,
    })?;

    let mut references = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BridgeError::DirectoryExpansion {
            dir: dir.clone(),
            source,
        })?;
        let file_type = entry
            .file_type()
            .map_err(|source| BridgeError::DirectoryExpansion {
                dir: dir.clone(),
                source,
            })?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        references.push(format!("{canonical}/{name}"));
    }
    references.sort();

    debug!(
        "expanded tree {directory} into {} references",
        references.len()
    );
    Ok(references)
}
