//! Rule to forbid hardcoded regions and partitions in ARNs anywhere.
//!
//! # Rationale
//!
//! ARNs show up in almost every resource type (`source_arn`, `topic_arn`,
//! `key_id`, principals in trust policies). Instead of listing attributes,
//! this rule walks every expression and inspects each one that evaluates to
//! an ARN. Values depending on variables or data sources are skipped.
//!
//! # Detected Patterns
//!
//! - `arn:aws:sns:us-west-2:123456789012:topic` reports the partition and the
//!   region, one issue each
//! - ARNs nested in other ARNs (API Gateway integration URIs) are reported for
//!   every embedded ARN

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-meta-hardcoded.
pub const CODE: &str = "AM006";

/// Rule name for aws-meta-hardcoded.
pub const NAME: &str = "aws-meta-hardcoded";

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::WholeTree,
    shape: ValueShape::ArnPrefixed,
    families: &[Family::RegionInArn, Family::PartitionInArn],
    subject: None,
};

/// Forbids hardcoded regions and partitions in ARN literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsMetaHardcoded;

impl AwsMetaHardcoded {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsMetaHardcoded {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids hardcoded regions and partitions in ARNs"
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}
