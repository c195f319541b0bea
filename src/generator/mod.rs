pub mod fixer;
pub mod rewriter;

// Re-export the pipeline entry points
pub use fixer::{fix_document, ProxyFixer};
pub use rewriter::rewrite;
