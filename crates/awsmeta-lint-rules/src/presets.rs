//! Rule presets and configuration-driven rule selection.

use crate::{
    AwsIamPolicyHardcodedPartition, AwsIamPolicyHardcodedRegion,
    AwsIamRolePolicyHardcodedPartition, AwsIamRolePolicyHardcodedRegion, AwsMetaHardcoded,
    AwsProviderHardcodedRegion, AwsServicePrincipalDnsSuffix, AwsServicePrincipalHardcoded,
};
use awsmeta_lint_core::{Config, RuleBox};
use std::fmt;
use std::str::FromStr;

/// Preset configurations for awsmeta-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Rules that are enabled by default.
    #[default]
    Recommended,
    /// Every rule.
    Strict,
    /// Only `aws-meta-hardcoded`, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => all_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    /// Returns the preset name as written in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown preset '{0}' (expected recommended, strict or minimal)")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Returns every available rule.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(AwsIamRolePolicyHardcodedRegion::new()),
        Box::new(AwsIamRolePolicyHardcodedPartition::new()),
        Box::new(AwsIamPolicyHardcodedRegion::new()),
        Box::new(AwsIamPolicyHardcodedPartition::new()),
        Box::new(AwsProviderHardcodedRegion::new()),
        Box::new(AwsMetaHardcoded::new()),
        Box::new(AwsServicePrincipalHardcoded::new()),
        Box::new(AwsServicePrincipalDnsSuffix::new()),
    ]
}

/// Returns the rules that are enabled by default.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    all_rules()
        .into_iter()
        .filter(|rule| rule.enabled_by_default())
        .collect()
}

/// Returns the minimal set of rules.
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![Box::new(AwsMetaHardcoded::new())]
}

/// Resolves the rule set for `preset`, adjusted by `[rules.<name>]` entries.
///
/// `enabled = true` adds a rule the preset leaves out; `enabled = false`
/// removes one it includes.
#[must_use]
pub fn resolve(preset: Preset, config: &Config) -> Vec<RuleBox> {
    let selected: Vec<&'static str> = preset.rules().iter().map(|rule| rule.name()).collect();

    all_rules()
        .into_iter()
        .filter(|rule| {
            config
                .rule_enabled(rule.name())
                .unwrap_or_else(|| selected.contains(&rule.name()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[RuleBox]) -> Vec<&'static str> {
        rules.iter().map(|rule| rule.name()).collect()
    }

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Strict.rules().len(), 8);
        assert_eq!(Preset::Recommended.rules().len(), 6);
        assert_eq!(names(&Preset::Minimal.rules()), ["aws-meta-hardcoded"]);
    }

    #[test]
    fn test_recommended_excludes_opt_in_rules() {
        let recommended = names(&recommended_rules());
        assert!(!recommended.contains(&"aws-provider-hardcoded-region"));
        assert!(!recommended.contains(&"aws-service-principal-hardcoded"));
        assert!(recommended.contains(&"aws-service-principal-dns-suffix"));
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = all_rules().iter().map(|rule| rule.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!("strict".parse::<Preset>(), Ok(Preset::Strict));
        assert_eq!("Minimal".parse::<Preset>(), Ok(Preset::Minimal));
        assert!("everything".parse::<Preset>().is_err());
        assert_eq!(Preset::default().to_string(), "recommended");
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let config = Config::parse(
            r#"
[rules.aws-provider-hardcoded-region]
enabled = true

[rules.aws-meta-hardcoded]
enabled = false
"#,
        )
        .unwrap();

        let rules = names(&resolve(Preset::Recommended, &config));
        assert!(rules.contains(&"aws-provider-hardcoded-region"));
        assert!(!rules.contains(&"aws-meta-hardcoded"));
        assert_eq!(rules.len(), 6);

        let minimal = names(&resolve(Preset::Minimal, &Config::default()));
        assert_eq!(minimal, ["aws-meta-hardcoded"]);
    }
}
