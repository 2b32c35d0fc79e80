//! Rule to forbid hardcoded regions in inline role policies.
//!
//! # Rationale
//!
//! A region written into an `aws_iam_role_policy` document pins the policy to
//! that region. `data.aws_region.current.name` keeps it portable.
//!
//! # Detected Patterns
//!
//! - A region in the region field of an ARN
//! - A region anywhere else in the policy, such as an S3 key prefix
//!
//! Values built from references or unknown functions are skipped.

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{AttributeTarget, CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-iam-role-policy-hardcoded-region.
pub const CODE: &str = "AM001";

/// Rule name for aws-iam-role-policy-hardcoded-region.
pub const NAME: &str = "aws-iam-role-policy-hardcoded-region";

const TARGETS: &[AttributeTarget] = &[AttributeTarget::resource("aws_iam_role_policy", "policy")];

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::Attributes(TARGETS),
    shape: ValueShape::Any,
    families: &[Family::RegionInArn, Family::RegionEmbedded],
    subject: Some("IAM role policy"),
};

/// Forbids hardcoded regions in `aws_iam_role_policy.policy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsIamRolePolicyHardcodedRegion;

impl AwsIamRolePolicyHardcodedRegion {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsIamRolePolicyHardcodedRegion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids hardcoded AWS regions in IAM role policies"
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;

    #[test]
    fn test_region_in_resource_path() {
        let issues = check(
            &AwsIamRolePolicyHardcodedRegion::new(),
            r#"
resource "aws_iam_role_policy" "example" {
  name   = "example-policy"
  role   = "example-role"
  policy = "arn:aws:s3:::my-bucket/us-east-1/*"
}
"#,
        );
        assert_eq!(issues.len(), 1);
        insta::assert_snapshot!(
            &issues[0].message,
            @"Hardcoded AWS region 'us-east-1' found in IAM role policy. Consider using data.aws_region.current.name"
        );
    }

    #[test]
    fn test_no_region() {
        let issues = check(
            &AwsIamRolePolicyHardcodedRegion::new(),
            r#"
resource "aws_iam_role_policy" "example" {
  name   = "example-policy"
  role   = "example-role"
  policy = "arn:aws:s3:::my-bucket/variable-region/*"
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_region_in_arn_field_of_document() {
        let issues = check(
            &AwsIamRolePolicyHardcodedRegion::new(),
            r#"
resource "aws_iam_role_policy" "example" {
  role = "example-role"
  policy = jsonencode({
    Version = "2012-10-17"
    Statement = [{
      Effect   = "Allow"
      Action   = ["logs:PutLogEvents"]
      Resource = ["arn:aws:logs:eu-west-1:123456789012:log-group:app:*"]
    }]
  })
}
"#,
        );
        assert_eq!(issues.len(), 1);
        insta::assert_snapshot!(
            &issues[0].message,
            @"Hardcoded AWS region 'eu-west-1' found in ARN within IAM role policy document. Consider using data.aws_region.current.name"
        );
    }

    #[test]
    fn test_other_resource_types_ignored() {
        let issues = check(
            &AwsIamRolePolicyHardcodedRegion::new(),
            r#"
resource "aws_iam_policy" "example" {
  policy = "arn:aws:s3:::my-bucket/us-east-1/*"
}
"#,
        );
        assert!(issues.is_empty());
    }
}
