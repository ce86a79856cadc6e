//! Find-class command implementation.

use anyhow::{bail, Result};
use bazel_aspect_core::ClassIdentifier;
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Runs the find-class command.
pub fn run(class: &str, path: &Path, aspects: Option<&Path>, source: &ConfigSource) -> Result<()> {
    let config = super::load_config(source)?;
    let report = super::scan_jars(path, aspects, &config)?;

    let class_id = ClassIdentifier::new(class);
    let matches: Vec<_> = report.index.find_class(&class_id).collect();
    if matches.is_empty() {
        bail!("{class} not found in {} jar(s)", report.index.len());
    }

    for entry in matches {
        println!(
            "{}\t{}\t{}",
            entry.id(),
            entry.bazel_label().unwrap_or("-"),
            entry.location_on_disk().display()
        );
    }

    Ok(())
}
