//! Rule to forbid hardcoded partitions in inline role policy ARNs.
//!
//! `arn:aws:...` only resolves in the commercial partition. Policies meant for
//! China or GovCloud accounts need `data.aws_partition.current.partition`.

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{AttributeTarget, CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-iam-role-policy-hardcoded-partition.
pub const CODE: &str = "AM002";

/// Rule name for aws-iam-role-policy-hardcoded-partition.
pub const NAME: &str = "aws-iam-role-policy-hardcoded-partition";

const TARGETS: &[AttributeTarget] = &[AttributeTarget::resource("aws_iam_role_policy", "policy")];

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::Attributes(TARGETS),
    shape: ValueShape::Any,
    families: &[Family::PartitionInArn],
    subject: Some("IAM role policy"),
};

/// Forbids hardcoded partitions in `aws_iam_role_policy.policy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsIamRolePolicyHardcodedPartition;

impl AwsIamRolePolicyHardcodedPartition {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsIamRolePolicyHardcodedPartition {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids hardcoded AWS partitions in IAM role policy ARNs"
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}
