//! Check command implementation.

use anyhow::{Context, Result};
use awsmeta_lint_core::{Analyzer, Config, RuleBox};
use awsmeta_lint_rules::{all_rules, resolve, Preset};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line options of `check`.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Preset name, overriding the configuration.
    pub preset: Option<String>,
}

/// Runs the check command.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;
    let threshold = config
        .fail_threshold()
        .context("Invalid fail_on in configuration")?;

    let rules = match &options.rules {
        Some(filter) => filter_rules(filter),
        None => {
            let preset = select_preset(options.preset.as_deref(), &config)?;
            tracing::debug!("Using preset: {preset}");
            resolve(preset, &config)
        }
    };

    let analyzer = Analyzer::builder()
        .root(path)
        .excludes(options.exclude.iter().cloned())
        .rules(rules)
        .config(config)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        path.display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, options.format, analyzer.root())?;

    if result.truncated {
        tracing::warn!("Issue limit reached; results are incomplete");
    }

    if result.has_issues_at(threshold) {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

fn select_preset(flag: Option<&str>, config: &Config) -> Result<Preset> {
    match flag.or(config.preset.as_deref()) {
        Some(name) => Ok(name.parse()?),
        None => Ok(Preset::default()),
    }
}

/// Picks rules by name or code, ignoring configured enablement.
fn filter_rules(filter: &str) -> Vec<RuleBox> {
    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    for name in &wanted {
        if !all_rules()
            .iter()
            .any(|rule| rule.name() == *name || rule.code().eq_ignore_ascii_case(name))
        {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    all_rules()
        .into_iter()
        .filter(|rule| {
            wanted
                .iter()
                .any(|name| rule.name() == *name || rule.code().eq_ignore_ascii_case(name))
        })
        .collect()
}
