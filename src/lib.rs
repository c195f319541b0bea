pub mod constants;
pub mod generator;
pub mod interfaces;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;

// Re-export the pipeline entry points for easier access
pub use generator::{fix_document, ProxyFixer};
pub use models::{Classification, FixReport, FixSummary, FixWarning};

// Re-export configuration and file-level types
pub use interfaces::{FileFixer, FixError, FixOptions};
pub use settings::Settings;
