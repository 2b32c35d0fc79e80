//! Rule to forbid hardcoded partitions in managed IAM policy ARNs.

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{AttributeTarget, CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-iam-policy-hardcoded-partition.
pub const CODE: &str = "AM004";

/// Rule name for aws-iam-policy-hardcoded-partition.
pub const NAME: &str = "aws-iam-policy-hardcoded-partition";

const TARGETS: &[AttributeTarget] = &[AttributeTarget::resource("aws_iam_policy", "policy")];

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::Attributes(TARGETS),
    shape: ValueShape::Any,
    families: &[Family::PartitionInArn],
    subject: Some("IAM policy"),
};

/// Forbids hardcoded partitions in `aws_iam_policy.policy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsIamPolicyHardcodedPartition;

impl AwsIamPolicyHardcodedPartition {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsIamPolicyHardcodedPartition {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids hardcoded AWS partitions in IAM policy ARNs"
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}
