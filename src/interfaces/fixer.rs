//! File-level fixer
//!
//! Everything that touches the filesystem lives here: input validation,
//! backups, output naming, overwrite protection and batch processing. The
//! document itself is handed to [`ProxyFixer`], which does no I/O.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::constants::{TOOL_NAME, TOOL_VERSION};
use crate::generator::ProxyFixer;
use crate::interfaces::error::FixError;
use crate::models::{Classification, EntrySyntax, FixReport};
use crate::parser::{classify, field_value, EntryLocator};
use crate::settings::Settings;
use crate::utils::file::{append_to_file_name, file_exists, insert_before_extension, read_lossy};
use crate::utils::matcher::wildcard_match;
use crate::utils::yaml::{validate_yaml, YamlNode};

/// Per-run switches coming from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixOptions {
    /// Copy the input to `<input><backup_suffix>` before writing
    pub backup: bool,
    /// Overwrite an existing output file
    pub force: bool,
    /// Do everything except writing files
    pub dry_run: bool,
}

/// Result of fixing one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backup: Option<PathBuf>,
    pub report: FixReport,
    /// False for dry runs
    pub written: bool,
}

/// Result of one file of a batch run
#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub result: Result<FileReport, FixError>,
}

/// One recognized proxy entry, as shown by a preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub name: String,
    pub server: String,
    pub syntax: EntrySyntax,
    pub classification: Classification,
}

#[derive(Debug, Clone)]
pub struct FileFixer {
    settings: Settings,
    options: FixOptions,
    fixer: ProxyFixer,
}

impl FileFixer {
    pub fn new(settings: Settings, options: FixOptions) -> Self {
        let fixer = ProxyFixer::new(settings.locator_options());
        FileFixer {
            settings,
            options,
            fixer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> FixOptions {
        self.options
    }

    /// First configured default input file present in `dir`
    pub fn find_default_input(&self, dir: &Path) -> Option<PathBuf> {
        self.settings
            .default_input_files
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Where the fixed document of `input` goes when no output is given
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let is_primary_default = match (
            input.file_name().and_then(|n| n.to_str()),
            self.settings.default_input_files.first(),
        ) {
            (Some(name), Some(default)) => name == default,
            _ => false,
        };
        if is_primary_default {
            input.with_file_name(&self.settings.default_output_file)
        } else {
            insert_before_extension(input, &self.settings.output_suffix)
        }
    }

    pub fn backup_path_for(&self, input: &Path) -> PathBuf {
        append_to_file_name(input, &self.settings.backup_suffix)
    }

    /// Check that `path` is an existing YAML file within the size limit
    pub fn validate_input(&self, path: &Path) -> Result<(), FixError> {
        if !file_exists(path) {
            return Err(FixError::FileNotFound(path.to_path_buf()));
        }
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(FixError::NotAFile(path.to_path_buf()));
        }
        if !self.settings.has_yaml_extension(path) {
            return Err(FixError::UnsupportedExtension {
                path: path.to_path_buf(),
                expected: self.settings.yaml_extensions.join(", "),
            });
        }
        if metadata.len() > self.settings.max_file_size_bytes() {
            return Err(FixError::FileTooLarge {
                path: path.to_path_buf(),
                limit_mb: self.settings.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Fix one file, writing the result to `output` (or the derived output path)
    pub fn fix_file(&self, input: &Path, output: Option<&Path>) -> Result<FileReport, FixError> {
        self.validate_input(input)?;
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => self.output_path_for(input),
        };
        if output.exists() && !self.options.force && !self.options.dry_run {
            return Err(FixError::OutputExists(output));
        }

        info!("Processing: {}", input.display());
        let content = read_lossy(input)?;

        let backup = if self.options.backup && !self.options.dry_run {
            self.create_backup(input)
        } else {
            None
        };

        let mut report = self.fixer.fix(&content);
        if let Some(warning) = report.warning {
            warn!("{}: {}", input.display(), warning);
        }
        match YamlNode::from_str(&report.document) {
            Ok(node) => {
                if let Some(listed) = node.proxy_list_len() {
                    if listed != report.summary.proxy_count() {
                        debug!(
                            "{}: `proxies` lists {} items, {} recognized as proxies",
                            input.display(),
                            listed,
                            report.summary.proxy_count()
                        );
                    }
                }
            }
            Err(err) if validate_yaml(&content).is_ok() => warn!(
                "{}: fixed document no longer parses as YAML, please review it: {}",
                output.display(),
                err
            ),
            Err(_) => {}
        }
        if self.settings.add_header && report.changed() {
            report.document = format!("{}{}", self.header(input, &report), report.document);
        }

        let written = !self.options.dry_run;
        if written {
            fs::write(&output, &report.document)?;
            info!(
                "Fixed {} proxies in: {}",
                report.summary.rewritten_count,
                output.display()
            );
        } else {
            info!("Dry run: would write {}", output.display());
        }

        Ok(FileReport {
            input: input.to_path_buf(),
            output,
            backup,
            report,
            written,
        })
    }

    /// Files of `dir` a batch run would process, sorted by path
    pub fn batch_inputs(&self, dir: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>, FixError> {
        if !dir.is_dir() {
            return Err(FixError::DirectoryNotFound(dir.to_path_buf()));
        }
        let patterns = self.batch_patterns(pattern.unwrap_or(self.settings.batch_pattern.as_str()));

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !self.settings.has_yaml_extension(&path)
                || !patterns.iter().any(|p| wildcard_match(name, p))
            {
                continue;
            }
            if self.is_generated(&path) {
                debug!("Skipping generated file {}", path.display());
                continue;
            }
            files.push(path);
        }
        files.sort();

        if files.is_empty() {
            return Err(FixError::NoYamlFiles(dir.to_path_buf()));
        }
        Ok(files)
    }

    /// Fix every matching file of a directory; one failing file does not stop the rest
    pub fn fix_directory(&self, dir: &Path, pattern: Option<&str>) -> Result<Vec<BatchEntry>, FixError> {
        let files = self.batch_inputs(dir, pattern)?;
        info!("Found {} files in {}", files.len(), dir.display());

        Ok(files
            .into_iter()
            .map(|input| {
                let result = self.fix_file(&input, None);
                if let Err(err) = &result {
                    warn!("{}", err);
                }
                BatchEntry { input, result }
            })
            .collect())
    }

    /// List the proxy entries of a file without changing anything
    pub fn preview(&self, input: &Path) -> Result<Vec<PreviewEntry>, FixError> {
        self.validate_input(input)?;
        let content = read_lossy(input)?;

        Ok(EntryLocator::with_options(&content, self.fixer.options())
            .filter_map(|candidate| {
                let classification = classify(&candidate);
                if classification == Classification::NotAProxy {
                    return None;
                }
                Some(PreviewEntry {
                    name: field_value(&candidate, "name").unwrap_or_default().to_string(),
                    server: field_value(&candidate, "server").unwrap_or_default().to_string(),
                    syntax: candidate.syntax,
                    classification,
                })
            })
            .collect())
    }

    fn create_backup(&self, input: &Path) -> Option<PathBuf> {
        let backup = self.backup_path_for(input);
        match fs::copy(input, &backup) {
            Ok(_) => {
                info!("Created backup: {}", backup.display());
                Some(backup)
            }
            Err(err) => {
                warn!("Failed to create backup {}: {}", backup.display(), err);
                None
            }
        }
    }

    /// `pattern` plus its variants for the other YAML extensions
    /// (`*.yaml` also selects `*.yml` with the default extensions)
    fn batch_patterns(&self, pattern: &str) -> Vec<String> {
        let lowered = pattern.to_ascii_lowercase();
        let matched = self
            .settings
            .yaml_extensions
            .iter()
            .find(|ext| lowered.ends_with(&ext.to_ascii_lowercase()));

        let mut patterns = vec![pattern.to_string()];
        if let Some(matched) = matched {
            let prefix = &pattern[..pattern.len() - matched.len()];
            patterns.extend(
                self.settings
                    .yaml_extensions
                    .iter()
                    .filter(|ext| !ext.eq_ignore_ascii_case(matched))
                    .map(|ext| format!("{}{}", prefix, ext)),
            );
        }
        patterns
    }

    /// Outputs and backups of earlier runs
    fn is_generated(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let stem = path.file_stem().and_then(|n| n.to_str()).unwrap_or_default();
        name == self.settings.default_output_file
            || stem.ends_with(&self.settings.output_suffix)
            || name.ends_with(&self.settings.backup_suffix)
    }

    fn header(&self, input: &Path, report: &FixReport) -> String {
        let source = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rule = format!("# {}\n", "=".repeat(75));
        let mut header = String::new();
        header.push_str(&rule);
        header.push_str("# Clash configuration with certificate verification disabled\n");
        header.push_str(&format!("# Generated by {} v{}\n", TOOL_NAME, TOOL_VERSION));
        header.push_str(&format!("# Source: {}\n", source));
        header.push_str(&format!(
            "# Proxies fixed: {}\n",
            report.summary.rewritten_count
        ));
        header.push_str("# Security warning: skip-cert-verify: true disables certificate validation.\n");
        header.push_str("# Use only with trusted servers.\n");
        header.push_str(&rule);
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        let fixer = FileFixer::new(Settings::default(), FixOptions::default());
        assert_eq!(
            fixer.output_path_for(Path::new("dir/x509_no_fix.yaml")),
            PathBuf::from("dir/x509_fixed.yaml")
        );
        assert_eq!(
            fixer.output_path_for(Path::new("dir/clash.yml")),
            PathBuf::from("dir/clash_fixed.yml")
        );
        assert_eq!(
            fixer.backup_path_for(Path::new("x509_no_fix.yaml")),
            PathBuf::from("x509_no_fix.yaml.backup")
        );
    }

    #[test]
    fn test_batch_patterns_follow_yaml_extensions() {
        let fixer = FileFixer::new(Settings::default(), FixOptions::default());
        assert_eq!(fixer.batch_patterns("*.yaml"), vec!["*.yaml", "*.yml"]);
        assert_eq!(fixer.batch_patterns("home*.YML"), vec!["home*.YML", "home*.yaml"]);
        assert_eq!(fixer.batch_patterns("work*"), vec!["work*"]);

        let settings = Settings {
            yaml_extensions: vec![".yaml".to_string(), ".clash".to_string()],
            ..Settings::default()
        };
        let fixer = FileFixer::new(settings, FixOptions::default());
        assert_eq!(fixer.batch_patterns("*.yaml"), vec!["*.yaml", "*.clash"]);
    }

    #[test]
    fn test_is_generated() {
        let fixer = FileFixer::new(Settings::default(), FixOptions::default());
        assert!(fixer.is_generated(Path::new("x509_fixed.yaml")));
        assert!(fixer.is_generated(Path::new("clash_fixed.yml")));
        assert!(fixer.is_generated(Path::new("clash.yaml.backup")));
        assert!(!fixer.is_generated(Path::new("clash.yaml")));
    }
}
