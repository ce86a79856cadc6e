//! Configuration file resolution with workspace and global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `bazel-aspect.toml` or `.bazel-aspect.toml` in the nearest Bazel
//!    workspace root at or above the target directory
//! 3. `~/.bazel-aspect/config.toml` (global fallback)
//! 4. No config found → defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the Bazel workspace root.
    Workspace(PathBuf),
    /// Loaded from the global config directory (`~/.bazel-aspect/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Workspace(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Workspace-level config file names, checked in order.
const WORKSPACE_CONFIG_NAMES: &[&str] = &["bazel-aspect.toml", ".bazel-aspect.toml"];

/// Files marking the root of a Bazel workspace.
const WORKSPACE_MARKERS: &[&str] = &["MODULE.bazel", "WORKSPACE.bazel", "WORKSPACE"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(start_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(start_dir, explicit, global_config_dir())
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    start_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let workspace = find_workspace_root(start_dir).unwrap_or(start_dir);
    for name in WORKSPACE_CONFIG_NAMES {
        let candidate = workspace.join(name);
        if candidate.exists() {
            tracing::debug!("Found workspace config: {}", candidate.display());
            return ConfigSource::Workspace(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Walks up from `start` to the first directory holding a workspace marker.
fn find_workspace_root(start: &Path) -> Option<&Path> {
    start
        .ancestors()
        .find(|dir| WORKSPACE_MARKERS.iter().any(|m| dir.join(m).is_file()))
}

/// Returns the global config directory path.
///
/// Resolution: `$BAZEL_ASPECT_CONFIG_DIR` > `~/.bazel-aspect/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("BAZEL_ASPECT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".bazel-aspect"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("MODULE.bazel"), "").unwrap();
        tmp
    }

    #[test]
    fn explicit_takes_priority_over_workspace() {
        let ws = workspace();
        fs::write(ws.path().join("bazel-aspect.toml"), "").unwrap();
        let explicit = ws.path().join("custom.toml");

        let result = resolve_inner(ws.path(), Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn config_found_at_workspace_root_from_subdirectory() {
        let ws = workspace();
        fs::write(ws.path().join("bazel-aspect.toml"), "").unwrap();
        let sub = ws.path().join("bazel-bin/helloworld");
        fs::create_dir_all(&sub).unwrap();

        let result = resolve_inner(&sub, None, None);
        assert_eq!(
            result,
            ConfigSource::Workspace(ws.path().join("bazel-aspect.toml"))
        );
    }

    #[test]
    fn legacy_workspace_marker_is_recognized() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("WORKSPACE"), "").unwrap();
        fs::write(tmp.path().join(".bazel-aspect.toml"), "").unwrap();
        let sub = tmp.path().join("a");
        fs::create_dir(&sub).unwrap();

        let result = resolve_inner(&sub, None, None);
        assert_eq!(
            result,
            ConfigSource::Workspace(tmp.path().join(".bazel-aspect.toml"))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let ws = workspace();
        fs::write(ws.path().join("bazel-aspect.toml"), "").unwrap();
        fs::write(ws.path().join(".bazel-aspect.toml"), "").unwrap();

        let result = resolve_inner(ws.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Workspace(ws.path().join("bazel-aspect.toml"))
        );
    }

    #[test]
    fn start_dir_used_when_no_workspace_marker() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bazel-aspect.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        assert!(matches!(result, ConfigSource::Workspace(_)));
    }

    #[test]
    fn global_fallback_when_no_workspace_config() {
        let ws = workspace();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(ws.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );
        assert!(result.is_global());
    }

    #[test]
    fn no_config_anywhere_returns_default() {
        let ws = workspace();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(ws.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }
}
