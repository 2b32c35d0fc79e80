//! # awsmeta-lint-rules
//!
//! Built-in rules for awsmeta-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Default | Description |
//! |------|------|---------|-------------|
//! | AM001 | `aws-iam-role-policy-hardcoded-region` | on | Regions in `aws_iam_role_policy.policy` |
//! | AM002 | `aws-iam-role-policy-hardcoded-partition` | on | Partitions in `aws_iam_role_policy.policy` ARNs |
//! | AM003 | `aws-iam-policy-hardcoded-region` | on | Regions in `aws_iam_policy.policy` |
//! | AM004 | `aws-iam-policy-hardcoded-partition` | on | Partitions in `aws_iam_policy.policy` ARNs |
//! | AM005 | `aws-provider-hardcoded-region` | off | Regions in `provider "aws"` |
//! | AM006 | `aws-meta-hardcoded` | on | Regions and partitions in any ARN |
//! | AM007 | `aws-service-principal-hardcoded` | off | `<service>.amazonaws.com` literals |
//! | AM008 | `aws-service-principal-dns-suffix` | on | Principals built from `dns_suffix` |
//!
//! ## Usage
//!
//! ```ignore
//! use awsmeta_lint_core::Analyzer;
//! use awsmeta_lint_rules::{AwsMetaHardcoded, Preset};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./infra")
//!     .rules(Preset::Recommended.rules())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aws_iam_policy_hardcoded_partition;
mod aws_iam_policy_hardcoded_region;
mod aws_iam_role_policy_hardcoded_partition;
mod aws_iam_role_policy_hardcoded_region;
mod aws_meta_hardcoded;
mod aws_provider_hardcoded_region;
mod aws_service_principal_dns_suffix;
mod aws_service_principal_hardcoded;
mod presets;
#[cfg(test)]
mod test_support;

pub use aws_iam_policy_hardcoded_partition::AwsIamPolicyHardcodedPartition;
pub use aws_iam_policy_hardcoded_region::AwsIamPolicyHardcodedRegion;
pub use aws_iam_role_policy_hardcoded_partition::AwsIamRolePolicyHardcodedPartition;
pub use aws_iam_role_policy_hardcoded_region::AwsIamRolePolicyHardcodedRegion;
pub use aws_meta_hardcoded::AwsMetaHardcoded;
pub use aws_provider_hardcoded_region::AwsProviderHardcodedRegion;
pub use aws_service_principal_dns_suffix::AwsServicePrincipalDnsSuffix;
pub use aws_service_principal_hardcoded::AwsServicePrincipalHardcoded;
pub use presets::{all_rules, minimal_rules, recommended_rules, resolve, Preset, UnknownPreset};

/// Re-export core types for convenience.
pub use awsmeta_lint_core::{Issue, Rule, Severity};
