//! Loading aspect data files from disk.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::decoder::{decode_header, decode_target};
use super::model::{KindClassifier, TargetInfo};
use super::DecodeError;
use crate::config::DecoderConfig;

/// Errors that abort a batch load.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The aspect output directory could not be read.
    #[error("failed to walk aspect output directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A target failed to decode and the loader is set to fail fast.
    #[error("{path}: {source}")]
    Malformed {
        /// Aspect data file that failed.
        path: PathBuf,
        /// Decoding failure.
        source: DecodeError,
    },
}

/// One aspect data file that could not be decoded.
#[derive(Debug)]
pub struct LoadFailure {
    /// Aspect data file that failed.
    pub path: PathBuf,
    /// Decoding failure.
    pub error: DecodeError,
}

/// Result of loading a batch of aspect data files.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Decoded targets keyed by label.
    pub targets: BTreeMap<String, TargetInfo>,
    /// Files that failed to decode.
    pub failures: Vec<LoadFailure>,
    /// Number of files read.
    pub files_loaded: usize,
}

impl LoadReport {
    /// Returns true if any file failed to decode.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Looks up a decoded target by label.
    #[must_use]
    pub fn target(&self, label: &str) -> Option<&TargetInfo> {
        self.targets.get(label)
    }
}

/// Builder for configuring an [`AspectLoader`].
#[derive(Debug, Default)]
pub struct AspectLoaderBuilder {
    jvm_kinds: Vec<String>,
    suffixes: Vec<String>,
    fail_on_malformed: bool,
}

impl AspectLoaderBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the `[decoder]` section of the configuration.
    #[must_use]
    pub fn config(mut self, config: &DecoderConfig) -> Self {
        self.jvm_kinds.extend(config.jvm_kinds.iter().cloned());
        self.suffixes
            .extend(config.data_file_suffixes.iter().cloned());
        self.fail_on_malformed = config.fail_on_malformed;
        self
    }

    /// Adds a rule kind to decode as JVM.
    #[must_use]
    pub fn jvm_kind(mut self, kind: impl Into<String>) -> Self {
        self.jvm_kinds.push(kind.into());
        self
    }

    /// Adds a file name suffix identifying aspect data files.
    #[must_use]
    pub fn data_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffixes.push(suffix.into());
        self
    }

    /// Sets whether a malformed file aborts the batch (default: false).
    #[must_use]
    pub fn fail_on_malformed(mut self, fail: bool) -> Self {
        self.fail_on_malformed = fail;
        self
    }

    /// Builds the loader.
    #[must_use]
    pub fn build(self) -> AspectLoader {
        let suffixes = if self.suffixes.is_empty() {
            DecoderConfig::default().data_file_suffixes
        } else {
            self.suffixes
        };

        AspectLoader {
            classifier: KindClassifier::new().with_jvm_kinds(self.jvm_kinds),
            suffixes,
            fail_on_malformed: self.fail_on_malformed,
        }
    }
}

/// Decodes aspect data files into [`TargetInfo`] records.
///
/// Use [`AspectLoader::builder()`] to construct an instance.
#[derive(Debug)]
pub struct AspectLoader {
    classifier: KindClassifier,
    suffixes: Vec<String>,
    fail_on_malformed: bool,
}

impl Default for AspectLoader {
    fn default() -> Self {
        AspectLoaderBuilder::new().build()
    }
}

impl AspectLoader {
    /// Creates a new builder for configuring a loader.
    #[must_use]
    pub fn builder() -> AspectLoaderBuilder {
        AspectLoaderBuilder::new()
    }

    /// Decodes one already-parsed target record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed.
    pub fn load_value(&self, raw: &Value) -> Result<TargetInfo, DecodeError> {
        let header = decode_header(raw)?;
        decode_target(raw, header, &self.classifier)
    }

    /// Decodes one target record from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or the record is malformed.
    pub fn load_str(&self, text: &str) -> Result<TargetInfo, DecodeError> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| DecodeError::from_json("target record", e))?;
        self.load_value(&raw)
    }

    /// Reads and decodes one aspect data file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load_file(&self, path: &Path) -> Result<TargetInfo, DecodeError> {
        debug!("Loading aspect data: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(self.load_str(&text)?.with_aspect_data_file(path))
    }

    /// Loads a batch of aspect data files.
    ///
    /// A file that fails to decode is recorded in [`LoadReport::failures`]
    /// and does not affect the others. When a label appears twice the
    /// first record is kept.
    ///
    /// # Errors
    ///
    /// Returns an error only when `fail_on_malformed` is set and a file fails.
    pub fn load_files<I, P>(&self, paths: I) -> Result<LoadReport, LoaderError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = LoadReport::default();

        for path in paths {
            let path = path.as_ref();
            report.files_loaded += 1;
            match self.load_file(path) {
                Ok(target) => {
                    if report.targets.contains_key(target.label()) {
                        warn!(
                            "Duplicate label {} in {}, keeping the first record",
                            target.label(),
                            path.display()
                        );
                        continue;
                    }
                    report.targets.insert(target.label().to_string(), target);
                }
                Err(error) => {
                    warn!("Failed to decode {}: {}", path.display(), error);
                    if self.fail_on_malformed {
                        return Err(LoaderError::Malformed {
                            path: path.to_path_buf(),
                            source: error,
                        });
                    }
                    report.failures.push(LoadFailure {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }

        info!(
            "Decoded {} target(s) from {} file(s), {} failure(s)",
            report.targets.len(),
            report.files_loaded,
            report.failures.len()
        );

        Ok(report)
    }

    /// Finds aspect data files under `root`, sorted by path.
    ///
    /// Symlinks are followed, since `bazel-out` usually is one. Entries
    /// below `root` that cannot be read, such as stale symlinks, are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` itself cannot be read.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, LoaderError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("Found {} aspect data file(s) under {}", files.len(), root.display());
        Ok(files)
    }

    /// Discovers and loads every aspect data file under `root`.
    ///
    /// # Errors
    ///
    /// See [`AspectLoader::discover`] and [`AspectLoader::load_files`].
    pub fn load_dir(&self, root: &Path) -> Result<LoadReport, LoaderError> {
        let files = self.discover(root)?;
        self.load_files(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LIB: &str = r#"{"label": "//a:a", "kind": "java_library",
        "java_ide_info": {"jars": ["{\"jar\":\"out/a.jar\"}"]}}"#;

    #[test]
    fn load_str_reads_envelope_and_ide_info() {
        let target = AspectLoader::default().load_str(LIB).unwrap();
        assert_eq!(target.label(), "//a:a");
        assert_eq!(target.kind(), "java_library");
        assert_eq!(target.as_jvm().unwrap().jars().len(), 1);
        assert!(target.aspect_data_file().is_none());
    }

    #[test]
    fn load_str_rejects_invalid_json() {
        let err = AspectLoader::default().load_str("{").unwrap_err();
        assert!(matches!(err, DecodeError::Syntax { .. }));
    }

    #[test]
    fn configured_kind_is_decoded_as_jvm() {
        let loader = AspectLoader::builder().jvm_kind("my_jvm_rule").build();
        let target = loader
            .load_str(r#"{"label": "//a:a", "kind": "my_jvm_rule"}"#)
            .unwrap();
        assert!(target.is_jvm());
    }

    #[test]
    fn load_files_skips_malformed_and_keeps_siblings() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("a.bzljavasdk-data.json");
        let bad = tmp.path().join("b.bzljavasdk-data.json");
        fs::write(&good, LIB).unwrap();
        fs::write(&bad, r#"{"label": "//b:b", "java_ide_info": {"jars": 7}}"#).unwrap();

        let report = AspectLoader::default().load_files([&bad, &good]).unwrap();
        assert_eq!(report.files_loaded, 2);
        assert_eq!(report.targets.len(), 1);
        assert_eq!(
            report.target("//a:a").unwrap().aspect_data_file(),
            Some(good.as_path())
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, bad);
    }

    #[test]
    fn fail_on_malformed_aborts_batch() {
        let tmp = TempDir::new().unwrap();
        let bad = tmp.path().join("b.bzljavasdk-data.json");
        fs::write(&bad, "[]").unwrap();

        let loader = AspectLoader::builder().fail_on_malformed(true).build();
        let err = loader.load_files([&bad]).unwrap_err();
        assert!(matches!(err, LoaderError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_a_target_scoped_failure() {
        let report = AspectLoader::default()
            .load_files(["/nonexistent/x.bzljavasdk-data.json"])
            .unwrap();
        assert!(matches!(report.failures[0].error, DecodeError::Io { .. }));
    }

    #[test]
    fn duplicate_label_keeps_first() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("1.bzljavasdk-data.json");
        let second = tmp.path().join("2.bzljavasdk-data.json");
        fs::write(&first, LIB).unwrap();
        fs::write(&second, r#"{"label": "//a:a", "kind": "java_binary"}"#).unwrap();

        let report = AspectLoader::default().load_files([&first, &second]).unwrap();
        assert_eq!(report.targets.len(), 1);
        assert_eq!(report.target("//a:a").unwrap().kind(), "java_library");
    }

    #[test]
    fn discover_matches_suffixes_only() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("bazel-out/bin/a");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("a.bzljavasdk-data.json"), LIB).unwrap();
        fs::write(nested.join("a.jar"), "").unwrap();
        fs::write(tmp.path().join("b.java-info.json"), LIB).unwrap();

        let files = AspectLoader::default().discover(tmp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.to_string_lossy().ends_with(".json")));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.bzljavasdk-data.json"), LIB).unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", dir.join("dangling")).unwrap();

        let report = AspectLoader::default().load_dir(tmp.path()).unwrap();
        assert_eq!(report.files_loaded, 1);
        assert!(report.target("//a:a").is_some());
        assert!(!report.has_failures());
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = AspectLoader::default()
            .load_dir(Path::new("/nonexistent/bazel-bin"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::Walk(_)));
    }
}
