//! Decode command implementation.

use anyhow::{Context, Result};
use bazel_aspect_core::AspectLoader;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the decode command.
pub fn run(path: &Path, format: OutputFormat, source: &ConfigSource) -> Result<()> {
    let config = super::load_config(source)?;
    let loader = AspectLoader::builder().config(&config.decoder).build();

    tracing::info!("Decoding aspect data files under {:?}", path);

    let report = loader.load_dir(path).context("Decoding failed")?;

    super::output::print_targets(&report, format)?;

    if report.has_failures() {
        for failure in report.failures {
            eprintln!("{}:", failure.path.display());
            eprintln!("{:?}", miette::Report::new(failure.error));
        }
        std::process::exit(1);
    }

    Ok(())
}
