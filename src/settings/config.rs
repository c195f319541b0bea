use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::LocatorOptions;

/// Errors raised while loading a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings structure to hold the fixer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Files tried in order when no input path is given
    #[serde(default = "default_input_files")]
    pub default_input_files: Vec<String>,
    /// Output name used when the input is the first default input file
    #[serde(default = "default_output_file")]
    pub default_output_file: String,
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
    #[serde(default = "default_yaml_extensions")]
    pub yaml_extensions: Vec<String>,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default = "default_batch_pattern")]
    pub batch_pattern: String,

    // Output preferences
    #[serde(default)]
    pub add_header: bool,
    #[serde(default)]
    pub flow_requires_proxies_section: bool,

    /// Path the settings were loaded from, empty for defaults
    #[serde(skip)]
    pub pref_path: String,
}

// Default value functions for serde
fn default_input_files() -> Vec<String> {
    vec![
        "x509_no_fix.yaml".to_string(),
        "config.yaml".to_string(),
        "clash.yaml".to_string(),
    ]
}

fn default_output_file() -> String {
    "x509_fixed.yaml".to_string()
}

fn default_output_suffix() -> String {
    "_fixed".to_string()
}

fn default_backup_suffix() -> String {
    ".backup".to_string()
}

fn default_yaml_extensions() -> Vec<String> {
    vec![".yaml".to_string(), ".yml".to_string()]
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_batch_pattern() -> String {
    "*.yaml".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_input_files: default_input_files(),
            default_output_file: default_output_file(),
            output_suffix: default_output_suffix(),
            backup_suffix: default_backup_suffix(),
            yaml_extensions: default_yaml_extensions(),
            max_file_size_mb: default_max_file_size_mb(),
            batch_pattern: default_batch_pattern(),
            add_header: false,
            flow_requires_proxies_section: false,
            pref_path: String::new(),
        }
    }
}

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a YAML or TOML file
    ///
    /// `.toml` files are read as TOML, `.yaml`/`.yml` as YAML. Any other
    /// extension is tried as TOML first and YAML second.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let mut settings = match extension.as_deref() {
            Some("toml") => Self::from_toml(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            _ => match Self::from_toml(&content) {
                Ok(settings) => settings,
                Err(_) => Self::from_yaml(&content)?,
            },
        };
        settings.pref_path = path.display().to_string();
        debug!("Loaded settings from {}", settings.pref_path);
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Locator knobs derived from these settings
    pub fn locator_options(&self) -> LocatorOptions {
        LocatorOptions {
            flow_requires_proxies_section: self.flow_requires_proxies_section,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Check a file name against the configured YAML extensions (case-insensitive)
    pub fn has_yaml_extension(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_ascii_lowercase(),
            None => return false,
        };
        self.yaml_extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_input_files[0], "x509_no_fix.yaml");
        assert_eq!(settings.default_output_file, "x509_fixed.yaml");
        assert_eq!(settings.output_suffix, "_fixed");
        assert_eq!(settings.backup_suffix, ".backup");
        assert_eq!(settings.max_file_size_bytes(), 10 * 1024 * 1024);
        assert!(!settings.add_header);
        assert!(!settings.locator_options().flow_requires_proxies_section);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml("add_header: true\nmax_file_size_mb: 2\n").unwrap();
        assert!(settings.add_header);
        assert_eq!(settings.max_file_size_mb, 2);
        assert_eq!(settings.output_suffix, "_fixed");
        assert_eq!(settings.yaml_extensions, vec![".yaml", ".yml"]);
    }

    #[test]
    fn test_toml() {
        let settings = Settings::from_toml(
            "flow_requires_proxies_section = true\noutput_suffix = \"-ok\"\n",
        )
        .unwrap();
        assert!(settings.flow_requires_proxies_section);
        assert_eq!(settings.output_suffix, "-ok");
        assert_eq!(settings.default_input_files.len(), 3);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Settings::from_yaml("add_header: [1, 2"),
            Err(SettingsError::Yaml(_))
        ));
    }

    #[test]
    fn test_has_yaml_extension() {
        let settings = Settings::default();
        assert!(settings.has_yaml_extension(Path::new("dir/Config.YML")));
        assert!(settings.has_yaml_extension(Path::new("clash.yaml")));
        assert!(!settings.has_yaml_extension(Path::new("clash.json")));
    }
}
