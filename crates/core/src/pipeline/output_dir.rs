use std::path::{Path, PathBuf};

use super::redaction_error::RedactionError;

/// Creates the output directory (and parents) if needed. Succeeds when it
/// already exists.
pub fn prepare_output_dir(dir: &Path) -> Result<PathBuf, RedactionError> {
    std::fs::create_dir_all(dir).map_err(|source| RedactionError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.to_path_buf())
}
