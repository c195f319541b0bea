//! Filesystem-facing collaborators of the fixing pipeline

pub mod error;
pub mod fixer;

pub use error::FixError;
pub use fixer::{BatchEntry, FileFixer, FileReport, FixOptions, PreviewEntry};
