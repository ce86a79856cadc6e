//! Jar discovery and class enumeration.
//!
//! The scanner reads archive entry names only; class files are never parsed.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::model::{
    ClassIdentifier, CodeLocationIdentifier, CodeLocationIndex, CodeLocationIndexEntry,
};
use crate::aspect::TargetInfo;
use crate::config::ScannerConfig;

/// Errors that can occur while scanning jars.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid exclude pattern.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The archive is not a readable zip file.
    #[error("failed to read archive {path}: {source}")]
    Archive {
        /// Archive path.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
}

/// One archive that could not be scanned.
#[derive(Debug)]
pub struct ScanFailure {
    /// Archive path.
    pub path: PathBuf,
    /// What went wrong.
    pub error: ScanError,
}

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// One entry per readable archive.
    pub index: CodeLocationIndex,
    /// Archives that could not be read.
    pub failures: Vec<ScanFailure>,
}

/// Enumerates the classes inside jars and builds index entries for them.
#[derive(Debug, Default)]
pub struct JarScanner {
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
    include_sources: bool,
    labels: HashMap<PathBuf, String>,
}

impl JarScanner {
    /// Creates a scanner from the `[scanner]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn new(config: &ScannerConfig) -> Result<Self, ScanError> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude,
            respect_gitignore: config.respect_gitignore,
            include_sources: config.include_sources,
            labels: HashMap::new(),
        })
    }

    /// Sets the map from root-relative jar path to producing target label.
    ///
    /// See [`label_map_from_targets`].
    #[must_use]
    pub fn with_labels(mut self, labels: HashMap<PathBuf, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Finds jars under `root`, sorted by path.
    ///
    /// Bazel output directories (`bazel-*`) directly under `root` are walked
    /// even when `.gitignore` lists them. Entries that cannot be read, such
    /// as stale symlinks, are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` itself cannot be read.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let io_error = |source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        };
        let metadata = fs::metadata(root).map_err(io_error)?;

        let mut jars = self.walk(root, root, self.respect_gitignore);
        if self.respect_gitignore && metadata.is_dir() {
            for dir in fs::read_dir(root).map_err(io_error)? {
                let Ok(dir) = dir else { continue };
                let path = dir.path();
                if is_bazel_output_dir(&path) {
                    jars.extend(self.walk(root, &path, false));
                }
            }
        }

        jars.sort();
        jars.dedup();
        Ok(jars)
    }

    fn walk(&self, root: &Path, start: &Path, git_ignore: bool) -> Vec<PathBuf> {
        let mut builder = ignore::WalkBuilder::new(start);
        builder
            .hidden(false)
            .git_ignore(git_ignore)
            .git_global(git_ignore)
            .git_exclude(git_ignore)
            .follow_links(true);

        let mut jars = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", start.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || !is_jar(path) {
                continue;
            }
            if is_source_jar(path) && !self.include_sources {
                continue;
            }
            if self.should_exclude(root, path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            jars.push(path.to_path_buf());
        }
        jars
    }

    /// Builds the index entry for one jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the jar cannot be opened or is not a zip archive.
    pub fn scan_jar(
        &self,
        root: &Path,
        jar: &Path,
    ) -> Result<CodeLocationIndexEntry, ScanError> {
        let file = File::open(jar).map_err(|e| ScanError::Io {
            path: jar.to_path_buf(),
            source: e,
        })?;
        let archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| ScanError::Archive {
                path: jar.to_path_buf(),
                source: e,
            })?;

        let to_class = if is_source_jar(jar) {
            ClassIdentifier::from_source_entry
        } else {
            ClassIdentifier::from_class_entry
        };
        let mut classes: Vec<ClassIdentifier> =
            archive.file_names().filter_map(to_class).collect();
        classes.sort();

        let relative = jar.strip_prefix(root).unwrap_or(jar);
        let mut entry = CodeLocationIndexEntry::new(jar, identifier_for(root, jar));
        if let Some(label) = self.labels.get(relative) {
            entry = entry.with_bazel_label(label.clone());
        }
        for class in classes {
            entry.add_class(class);
        }

        debug!("Scanned {}: {} class(es)", jar.display(), entry.class_count());
        Ok(entry)
    }

    /// Scans every jar under `root`.
    ///
    /// An unreadable archive is recorded in [`ScanReport::failures`] and the
    /// scan continues.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be read.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, ScanError> {
        info!("Scanning jars under {}", root.display());
        let mut report = ScanReport::default();

        for jar in self.discover(root)? {
            match self.scan_jar(root, &jar) {
                Ok(entry) => {
                    report.index.insert(entry);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", jar.display(), error);
                    report.failures.push(ScanFailure { path: jar, error });
                }
            }
        }

        info!(
            "Indexed {} jar(s), {} failure(s)",
            report.index.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn should_exclude(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
    }
}

/// Derives the identifier of a jar from its location under `root`.
///
/// A maven-style layout `g1/g2/artifact/version/artifact-version[-classifier].jar`
/// yields `g1.g2:artifact:version`; anything else yields the file stem.
#[must_use]
pub fn identifier_for(root: &Path, jar: &Path) -> CodeLocationIdentifier {
    let relative = jar.strip_prefix(root).unwrap_or(jar);
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    let stem = jar
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let [group @ .., artifact, version, _file] = parts.as_slice() {
        if !group.is_empty() && stem.starts_with(&format!("{artifact}-{version}")) {
            return CodeLocationIdentifier::from_coordinates(&group.join("."), artifact, version);
        }
    }

    CodeLocationIdentifier::new(stem)
}

/// Maps every output jar path of the given targets to the target's label.
///
/// Paths are taken as written in the aspect output, i.e. relative to the
/// execution root.
pub fn label_map_from_targets<'a, I>(targets: I) -> HashMap<PathBuf, String>
where
    I: IntoIterator<Item = &'a TargetInfo>,
{
    let mut labels = HashMap::new();
    for target in targets {
        let Some(jvm) = target.as_jvm() else {
            continue;
        };
        for path in jvm.output_jars().flat_map(|triple| triple.paths()) {
            labels
                .entry(PathBuf::from(path))
                .or_insert_with(|| target.label().to_string());
        }
    }
    labels
}

fn is_jar(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "jar")
}

fn is_source_jar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("-src.jar") || n.ends_with("-sources.jar"))
}

fn is_bazel_output_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("bazel-"))
        && path.is_dir()
}
