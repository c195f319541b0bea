pub mod file;
pub mod matcher;
pub mod string;
pub mod yaml;

// Re-export common utilities
pub use yaml::YamlNode;
