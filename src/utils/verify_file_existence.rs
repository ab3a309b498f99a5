use crate::index_engine::{IndexError, Result};
use std::path::Path;

/// Checks that an index input exists and is a regular file.
///
/// # Parameters:
/// - `role`: Human-readable name used in the error (e.g. `"header file"`).
/// - `path`: The path to check.
///
/// # Returns:
/// - `Ok(())` if the file exists and is a regular file.
/// - `Err(IndexError::Configuration)` otherwise.
pub fn verify_file_existence(role: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(IndexError::Configuration(format!(
            "{role} '{}' does not exist.",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(IndexError::Configuration(format!(
            "{role} '{}' is not a regular file.",
            path.display()
        )));
    }

    Ok(())
}
