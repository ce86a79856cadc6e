//! List-kinds command implementation.

use anyhow::Result;
use bazel_aspect_core::JVM_RULE_KINDS;

use crate::config_resolver::ConfigSource;

/// Runs the list-kinds command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let config = super::load_config(source)?;

    println!("Rule kinds decoded as JVM targets:\n");
    for kind in JVM_RULE_KINDS {
        println!("  {kind}");
    }

    let extra: Vec<&str> = config
        .decoder
        .jvm_kinds
        .iter()
        .map(String::as_str)
        .filter(|k| !JVM_RULE_KINDS.contains(k))
        .collect();
    if !extra.is_empty() {
        println!("\nFrom configuration:");
        for kind in extra {
            println!("  {kind}");
        }
    }

    println!("\nAny other kind is decoded as a generic target unless it carries java_ide_info.");
    println!("Add kinds under [decoder] jvm_kinds in bazel-aspect.toml.");

    Ok(())
}
