//! Configuration types for bazel-aspect.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Aspect decoding configuration.
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Jar scanning configuration.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Aspect decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// File name suffixes identifying aspect data files.
    #[serde(default = "default_suffixes")]
    pub data_file_suffixes: Vec<String>,

    /// Rule kinds to decode as JVM, on top of the built-in list.
    #[serde(default)]
    pub jvm_kinds: Vec<String>,

    /// Whether one malformed file aborts a batch load.
    #[serde(default)]
    pub fail_on_malformed: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            data_file_suffixes: default_suffixes(),
            jvm_kinds: Vec::new(),
            fail_on_malformed: false,
        }
    }
}

/// Jar scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Glob patterns to exclude from scanning.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Whether to also index `-src.jar` / `-sources.jar` archives.
    #[serde(default)]
    pub include_sources: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            respect_gitignore: true,
            include_sources: false,
        }
    }
}

fn default_suffixes() -> Vec<String> {
    vec![
        ".bzljavasdk-data.json".to_string(),
        ".java-info.json".to_string(),
    ]
}

fn default_exclude() -> Vec<String> {
    vec!["**/target/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.scanner.respect_gitignore);
        assert!(!config.decoder.fail_on_malformed);
        assert_eq!(config.decoder.data_file_suffixes.len(), 2);
    }

    #[test]
    fn test_empty_config_matches_default() {
        let config = Config::parse("").expect("Failed to parse");
        assert_eq!(
            config.decoder.data_file_suffixes,
            DecoderConfig::default().data_file_suffixes
        );
        assert!(config.scanner.respect_gitignore);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[decoder]
jvm_kinds = ["my_java_library"]
fail_on_malformed = true

[scanner]
exclude = ["**/third_party/**"]
include_sources = true
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.decoder.jvm_kinds, vec!["my_java_library"]);
        assert!(config.decoder.fail_on_malformed);
        assert_eq!(config.decoder.data_file_suffixes.len(), 2);
        assert_eq!(config.scanner.exclude, vec!["**/third_party/**"]);
        assert!(config.scanner.include_sources);
        assert!(config.scanner.respect_gitignore);
    }

    #[test]
    fn test_partial_scanner_section_keeps_default_exclude() {
        let toml = r#"
[scanner]
include_sources = true
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert!(config.scanner.include_sources);
        assert_eq!(config.scanner.exclude, ScannerConfig::default().exclude);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[decoder\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
