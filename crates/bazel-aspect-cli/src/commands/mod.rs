//! Subcommand implementations.

use anyhow::{Context, Result};
use bazel_aspect_core::{AspectLoader, Config, JarScanner, ScanReport};
use std::path::Path;

use crate::config_resolver::ConfigSource;

pub mod decode;
pub mod find_class;
pub mod index;
pub mod init;
pub mod list_kinds;
pub mod output;

/// Loads the resolved configuration, falling back to defaults.
pub fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Scans `path` for jars, labelling local outputs from the aspect files under
/// `aspects` when given.
pub fn scan_jars(path: &Path, aspects: Option<&Path>, config: &Config) -> Result<ScanReport> {
    let mut scanner = JarScanner::new(&config.scanner).context("Invalid scanner configuration")?;

    if let Some(dir) = aspects {
        let loader = AspectLoader::builder().config(&config.decoder).build();
        let report = loader
            .load_dir(dir)
            .with_context(|| format!("Failed to load aspect files from {}", dir.display()))?;
        for failure in &report.failures {
            tracing::warn!("Skipping {}: {}", failure.path.display(), failure.error);
        }
        let labels = bazel_aspect_core::label_map_from_targets(report.targets.values());
        tracing::debug!("Labelling with {} output jar(s)", labels.len());
        scanner = scanner.with_labels(labels);
    }

    tracing::info!("Scanning {} for jars", path.display());
    let report = scanner
        .scan(path)
        .with_context(|| format!("Jar scan failed: {}", path.display()))?;
    for failure in &report.failures {
        tracing::warn!("Skipping {}: {}", failure.path.display(), failure.error);
    }
    Ok(report)
}
