//! Rule to flag regions hardcoded in the AWS provider block.
//!
//! Off by default: pinning the provider region is common and often intended.
//! Enable it for modules that must deploy to any region.
//!
//! # Detected Patterns
//!
//! - `provider "aws" { region = "us-east-1" }`
//! - a region in the ARN of `assume_role { role_arn = ... }`

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{AttributeTarget, CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-provider-hardcoded-region.
pub const CODE: &str = "AM005";

/// Rule name for aws-provider-hardcoded-region.
pub const NAME: &str = "aws-provider-hardcoded-region";

const TARGETS: &[AttributeTarget] = &[
    AttributeTarget::provider("aws", "region"),
    AttributeTarget::provider("aws", "role_arn").within("assume_role"),
];

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::Attributes(TARGETS),
    shape: ValueShape::Any,
    families: &[Family::RegionExact, Family::RegionInArn],
    subject: Some("provider configuration"),
};

/// Flags hardcoded regions in `provider "aws"` blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsProviderHardcodedRegion;

impl AwsProviderHardcodedRegion {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsProviderHardcodedRegion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags hardcoded regions in AWS provider configuration"
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}
