//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `awsmeta-lint.toml` or `.awsmeta-lint.toml` in the target directory or
//!    the nearest ancestor, stopping at the repository root
//! 3. `$AWSMETA_LINT_CONFIG_DIR/config.toml` or `~/.awsmeta-lint/config.toml`
//! 4. No config found → defaults
//!
//! Searching upward lets `awsmeta-lint check modules/vpc` pick up the
//! configuration at the top of the repository.

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found next to the target or in one of its ancestors.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{}", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

/// Project-level config file names, checked in order within each directory.
const PROJECT_CONFIG_NAMES: &[&str] = &["awsmeta-lint.toml", ".awsmeta-lint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for a check of `target`.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_inner(target, explicit, global_config_dir());
    tracing::debug!("Configuration: {source}");
    source
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(target: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(target) {
        return ConfigSource::Project(found);
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Looks for a project config in `target` and its ancestors.
///
/// The search ends at the first directory containing `.git`.
fn find_project_config(target: &Path) -> Option<PathBuf> {
    let start = target
        .canonicalize()
        .unwrap_or_else(|_| target.to_path_buf());
    let start = if start.is_file() {
        start.parent().map(Path::to_path_buf)?
    } else {
        start
    };

    for dir in start.ancestors() {
        for name in PROJECT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// Returns the global config directory path.
///
/// Resolution: `$AWSMETA_LINT_CONFIG_DIR` > `~/.awsmeta-lint/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("AWSMETA_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".awsmeta-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A repository root with `.git` and a nested module directory.
    fn repo() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        let module = tmp.path().join("modules").join("vpc");
        fs::create_dir_all(&module).unwrap();
        (tmp, module)
    }

    fn canonical(path: PathBuf) -> PathBuf {
        path.canonicalize().unwrap()
    }

    #[test]
    fn explicit_takes_priority_over_project() {
        let (tmp, module) = repo();
        fs::write(module.join("awsmeta-lint.toml"), "").unwrap();
        let explicit = tmp.path().join("custom.toml");

        let result = resolve_inner(&module, Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn config_next_to_target() {
        let (_tmp, module) = repo();
        fs::write(module.join(".awsmeta-lint.toml"), "").unwrap();

        let result = resolve_inner(&module, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(module.join(".awsmeta-lint.toml")))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let (_tmp, module) = repo();
        fs::write(module.join("awsmeta-lint.toml"), "").unwrap();
        fs::write(module.join(".awsmeta-lint.toml"), "").unwrap();

        let result = resolve_inner(&module, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(module.join("awsmeta-lint.toml")))
        );
    }

    #[test]
    fn config_found_at_repository_root() {
        let (tmp, module) = repo();
        fs::write(tmp.path().join("awsmeta-lint.toml"), "").unwrap();

        let result = resolve_inner(&module, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path().join("awsmeta-lint.toml")))
        );
    }

    #[test]
    fn nearest_config_wins() {
        let (tmp, module) = repo();
        fs::write(tmp.path().join("awsmeta-lint.toml"), "").unwrap();
        fs::write(tmp.path().join("modules").join("awsmeta-lint.toml"), "").unwrap();

        let result = resolve_inner(&module, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path().join("modules").join("awsmeta-lint.toml")))
        );
    }

    #[test]
    fn search_stops_at_repository_root() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join("awsmeta-lint.toml"), "").unwrap();
        let repo_root = outer.path().join("repo");
        fs::create_dir_all(repo_root.join(".git")).unwrap();

        let result = resolve_inner(&repo_root, None, None);
        assert_eq!(result, ConfigSource::Default);
    }

    #[test]
    fn global_fallback_when_no_project_config() {
        let (_tmp, module) = repo();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(&module, None, Some(global.path().to_path_buf()));
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );
        assert!(result.is_global());
    }

    #[test]
    fn global_dir_missing_config_file_returns_default() {
        let (_tmp, module) = repo();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(&module, None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }

    #[test]
    fn display_names_the_source() {
        let p = PathBuf::from("/tmp/test.toml");
        assert_eq!(ConfigSource::Explicit(p.clone()).to_string(), "/tmp/test.toml (--config)");
        assert_eq!(ConfigSource::Global(p).to_string(), "/tmp/test.toml (global)");
        assert_eq!(ConfigSource::Default.to_string(), "built-in defaults");
    }
}
