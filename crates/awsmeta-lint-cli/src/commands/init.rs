//! Init command implementation.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

const CONFIG_NAME: &str = "awsmeta-lint.toml";

const DEFAULT_CONFIG: &str = r#"# awsmeta-lint configuration

# Rule preset: recommended (default), strict or minimal
preset = "recommended"

# Exit with status 1 when issues at or above this severity are found
# fail_on = "warning"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./infra"

# Glob patterns to exclude from analysis
exclude = [
    "**/.terraform/**",
]

# Respect .gitignore files
respect_gitignore = true

# Stop after this many issues
# max_issues = 500

# Fail instead of skipping files that do not parse
# fail_on_parse_error = false

[reference]
# Partition table to use instead of the built-in one
# file = "partitions.toml"

# Replace individual lists
# regions = ["us-east-1", "eu-west-1"]
# partitions = ["aws", "aws-cn", "aws-us-gov"]
# service_principal_suffixes = ["amazonaws.com", "amazonaws.com.cn"]

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.aws-meta-hardcoded]
enabled = true
# severity = "error"

# [rules.aws-provider-hardcoded-region]
# enabled = true

# [rules.aws-service-principal-hardcoded]
# enabled = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: awsmeta-lint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsmeta_lint_core::{Config, Severity};
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert_eq!(config.fail_threshold().unwrap(), Severity::Warning);
        assert_eq!(config.rule_enabled("aws-meta-hardcoded"), Some(true));
        assert!(config.reference.file.is_none());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_NAME), "preset = \"strict\"\n").unwrap();

        assert!(write_config(tmp.path(), false).is_err());
        let kept = std::fs::read_to_string(tmp.path().join(CONFIG_NAME)).unwrap();
        assert_eq!(kept, "preset = \"strict\"\n");

        let path = write_config(tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), DEFAULT_CONFIG);
    }
}
