//! Rule to flag hardcoded service principals.
//!
//! `lambda.amazonaws.com` is wrong in China (`amazonaws.com.cn`) and, for some
//! services, in GovCloud. The `aws_service_principal` data source returns the
//! right name for the current partition.
//!
//! Off by default.

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::{CheckContext, CheckError, Emitter, IssueSink, Rule};

/// Rule code for aws-service-principal-hardcoded.
pub const CODE: &str = "AM007";

/// Rule name for aws-service-principal-hardcoded.
pub const NAME: &str = "aws-service-principal-hardcoded";

const PLAN: CheckPlan = CheckPlan {
    scope: Scope::WholeTree,
    shape: ValueShape::Any,
    families: &[Family::ServicePrincipal],
    subject: None,
};

/// Flags `<service>.amazonaws.com` style literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsServicePrincipalHardcoded;

impl AwsServicePrincipalHardcoded {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Rule for AwsServicePrincipalHardcoded {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags hardcoded service principals"
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;

    fn trust_policy(service: &str) -> String {
        format!(
            r#"
resource "aws_iam_role" "test" {{
  assume_role_policy = jsonencode({{
    Statement = [{{
      Principal = {{
        Service = {service}
      }}
    }}]
  }})
}}
"#
        )
    }

    fn count(service: &str) -> usize {
        check(&AwsServicePrincipalHardcoded::new(), &trust_policy(service)).len()
    }

    #[test]
    fn test_each_partition_suffix() {
        assert_eq!(count("\"s3.amazonaws.com\""), 1);
        assert_eq!(count("\"lambda.amazonaws.com.cn\""), 1);
        assert_eq!(count("\"ec2.amazonaws-us-gov.com\""), 1);
    }

    #[test]
    fn test_multiple_principals() {
        let issues = check(
            &AwsServicePrincipalHardcoded::new(),
            &trust_policy(
                r#"[
          "lambda.amazonaws.com",
          "ec2.amazonaws.com",
          "ecs-tasks.amazonaws.com"
        ]"#,
            ),
        );
        assert_eq!(issues.len(), 3);
        insta::assert_snapshot!(
            &issues[2].message,
            @"Hardcoded service principal 'ecs-tasks.amazonaws.com' found. Consider using data.aws_service_principal.ecs_tasks.name for multi-partition compatibility"
        );
    }

    #[test]
    fn test_china_suffix_not_split() {
        let issues = check(
            &AwsServicePrincipalHardcoded::new(),
            &trust_policy("\"lambda.amazonaws.com.cn\""),
        );
        assert!(issues[0].message.contains("'lambda.amazonaws.com.cn'"));
    }

    #[test]
    fn test_data_source_and_dns_suffix() {
        assert_eq!(count("data.aws_service_principal.s3.name"), 0);
        assert_eq!(count("\"s3.${data.aws_partition.current.dns_suffix}\""), 0);
    }
}
