//! Index command implementation.

use anyhow::Result;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the index command.
pub fn run(
    path: &Path,
    aspects: Option<&Path>,
    format: OutputFormat,
    source: &ConfigSource,
) -> Result<()> {
    let config = super::load_config(source)?;
    let report = super::scan_jars(path, aspects, &config)?;

    super::output::print_index(&report, format)?;

    if !report.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
