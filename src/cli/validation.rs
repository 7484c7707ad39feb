// validation.rs - Input validation utilities

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::cli::args::Args;
use crate::core::MergeConfig;
use crate::error::{MergeError, Result};

/// Arguments checked and ready for the merge core.
#[derive(Debug)]
pub struct ValidationResult {
    pub files: Vec<PathBuf>,
    pub merge_config: MergeConfig,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult> {
    let files = validate_paths(args.files.as_slice())?;
    let merge_config = MergeConfig::new(args.effective_batch_size())?;

    Ok(ValidationResult {
        files,
        merge_config,
    })
}

/// Require at least two input paths, each an openable regular file
pub fn validate_paths<S: AsRef<str>>(paths: &[S]) -> Result<Vec<PathBuf>> {
    if paths.len() < 2 {
        return Err(MergeError::Usage(
            "At least 2 CSV files must be specified.".to_string(),
        ));
    }

    paths
        .iter()
        .map(|p| check_readable(Path::new(p.as_ref())))
        .collect()
}

/// Check that `path` exists, is not a directory and can be opened for reading
pub fn check_readable(path: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(path).map_err(|e| MergeError::unreadable(path, e))?;
    if metadata.is_dir() {
        return Err(MergeError::unreadable(path, "is a directory"));
    }

    File::open(path).map_err(|e| MergeError::unreadable(path, e))?;
    Ok(path.to_path_buf())
}
