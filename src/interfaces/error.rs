use std::path::PathBuf;

use thiserror::Error;

/// Errors of the file-level fixer. The in-memory pipeline itself never fails.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("File must have a YAML extension ({expected}): {}", .path.display())]
    UnsupportedExtension { path: PathBuf, expected: String },

    #[error("File too large (> {limit_mb}MB): {}", .path.display())]
    FileTooLarge { path: PathBuf, limit_mb: u64 },

    #[error("Output file already exists: {} (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No YAML files found in: {}", .0.display())]
    NoYamlFiles(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
