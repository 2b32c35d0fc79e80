//! Rule to forbid hardcoded regions in managed IAM policies.

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{AttributeTarget, CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-iam-policy-hardcoded-region.
pub const CODE: &str = "AM003";

/// Rule name for aws-iam-policy-hardcoded-region.
pub const NAME: &str = "aws-iam-policy-hardcoded-region";

const TARGETS: &[AttributeTarget] = &[AttributeTarget::resource("aws_iam_policy", "policy")];

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::Attributes(TARGETS),
    shape: ValueShape::Any,
    families: &[Family::RegionInArn, Family::RegionEmbedded],
    subject: Some("IAM policy"),
};

/// Forbids hardcoded regions in `aws_iam_policy.policy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsIamPolicyHardcodedRegion;

impl AwsIamPolicyHardcodedRegion {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsIamPolicyHardcodedRegion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids hardcoded AWS regions in IAM policies"
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}
