//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# bazel-aspect configuration

[decoder]
# File name suffixes identifying aspect data files
data_file_suffixes = [
    ".bzljavasdk-data.json",
    ".java-info.json",
]

# Extra rule kinds to decode as JVM targets (built-ins: bazel-aspect list-kinds)
# jvm_kinds = ["my_java_rule"]

# Abort on the first malformed aspect data file
fail_on_malformed = false

[scanner]
# Glob patterns to exclude from jar scanning
exclude = [
    "**/target/**",
]

# Respect .gitignore files
respect_gitignore = true

# Also index -src.jar / -sources.jar archives
include_sources = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("bazel-aspect.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created bazel-aspect.toml");
    println!("\nNext steps:");
    println!("  1. Build with the aspect: bazel build //... --aspects=... --output_groups=...");
    println!("  2. Run: bazel-aspect decode bazel-bin");
    println!("  3. Run: bazel-aspect index --aspects bazel-bin .");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazel_aspect_core::Config;

    #[test]
    fn default_config_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(
            config.decoder.data_file_suffixes,
            defaults.decoder.data_file_suffixes
        );
        assert!(config.decoder.jvm_kinds.is_empty());
        assert!(!config.decoder.fail_on_malformed);
        assert_eq!(config.scanner.exclude, defaults.scanner.exclude);
        assert!(config.scanner.respect_gitignore);
        assert!(!config.scanner.include_sources);
    }
}
