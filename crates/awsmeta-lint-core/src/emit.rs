//! Turns pattern hits into issues.

use crate::patterns::{CompiledPattern, IdentifierKind, PatternMatch, PatternMode};
use crate::rule::Rule;
use crate::sink::{IssueSink, SinkError};
use crate::types::{Issue, Severity, SourceRange, Suggestion};

/// A hardcoded identifier found in a scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// What kind of identifier was found.
    pub kind: IdentifierKind,
    /// The literal identifier.
    pub value: String,
    /// Service name for service principals.
    pub service: Option<String>,
    /// Whether the identifier sat in an ARN field.
    pub in_arn: bool,
}

impl Finding {
    /// Creates a finding outside any ARN.
    #[must_use]
    pub fn new(kind: IdentifierKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            service: None,
            in_arn: false,
        }
    }

    /// Builds a finding from a hit of `pattern`.
    #[must_use]
    pub fn from_match(pattern: &CompiledPattern, hit: PatternMatch) -> Self {
        Self {
            kind: pattern.kind(),
            value: hit.value,
            service: hit.service,
            in_arn: matches!(pattern.mode(), PatternMode::InArn(_)),
        }
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Returns the expression to use instead of the literal.
    #[must_use]
    pub fn alternative(&self) -> String {
        match self.kind {
            IdentifierKind::Region => "data.aws_region.current.name".to_string(),
            IdentifierKind::Partition => "data.aws_partition.current.partition".to_string(),
            IdentifierKind::AvailabilityZone => {
                "data.aws_availability_zones.available.names".to_string()
            }
            IdentifierKind::ServicePrincipal | IdentifierKind::DnsSuffix => match &self.service {
                Some(service) => format!(
                    "data.aws_service_principal.{}.name",
                    service.replace('-', "_")
                ),
                None => "the data.aws_service_principal data source".to_string(),
            },
        }
    }

    /// Builds the issue message. `subject` names where the value was found,
    /// e.g. "IAM role policy".
    #[must_use]
    pub fn message(&self, subject: Option<&str>) -> String {
        let location = match (self.in_arn, subject) {
            (true, Some(subject)) => format!(" in ARN within {subject}"),
            (true, None) => " in ARN".to_string(),
            (false, Some(subject)) => format!(" in {subject}"),
            (false, None) => String::new(),
        };
        let alternative = self.alternative();

        match self.kind {
            IdentifierKind::Region
            | IdentifierKind::Partition
            | IdentifierKind::AvailabilityZone => format!(
                "Hardcoded AWS {} '{}' found{location}. Consider using {alternative}",
                self.kind, self.value
            ),
            IdentifierKind::ServicePrincipal => format!(
                "Hardcoded service principal '{}' found{location}. Consider using {alternative} for multi-partition compatibility",
                self.value
            ),
            IdentifierKind::DnsSuffix => format!(
                "Service principal uses dns_suffix. Consider using {alternative} instead for better maintainability"
            ),
        }
    }
}

/// Builds and forwards issues for one rule.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    code: &'static str,
    rule: &'static str,
    severity: Severity,
}

impl Emitter {
    /// Creates an emitter with explicit metadata.
    #[must_use]
    pub fn new(code: &'static str, rule: &'static str, severity: Severity) -> Self {
        Self {
            code,
            rule,
            severity,
        }
    }

    /// Creates an emitter for `rule` at `severity`.
    #[must_use]
    pub fn for_rule<R: Rule + ?Sized>(rule: &R, severity: Severity) -> Self {
        Self::new(rule.code(), rule.name(), severity)
    }

    /// Builds the issue for `finding` at `range`.
    #[must_use]
    pub fn issue(&self, range: SourceRange, finding: &Finding, subject: Option<&str>) -> Issue {
        Issue::new(
            self.code,
            self.rule,
            self.severity,
            range,
            finding.message(subject),
        )
        .with_suggestion(Suggestion::new(format!(
            "Replace with {}",
            finding.alternative()
        )))
    }

    /// Sends the issue for `finding` to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if it refuses the issue.
    pub fn emit(
        &self,
        sink: &mut dyn IssueSink,
        range: SourceRange,
        finding: &Finding,
        subject: Option<&str>,
    ) -> Result<(), SinkError> {
        tracing::debug!(code = self.code, location = %range, value = %finding.value, "Hardcoded value");
        sink.emit(self.issue(range, finding, subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn range() -> SourceRange {
        SourceRange::new("main.tf", Position::new(3, 12, 40), Position::new(3, 30, 58))
    }

    #[test]
    fn region_in_arn_message() {
        let finding = Finding {
            in_arn: true,
            ..Finding::new(IdentifierKind::Region, "us-east-1")
        };
        insta::assert_snapshot!(
            finding.message(Some("IAM role policy")),
            @"Hardcoded AWS region 'us-east-1' found in ARN within IAM role policy. Consider using data.aws_region.current.name"
        );
    }

    #[test]
    fn partition_message_without_subject() {
        let finding = Finding {
            in_arn: true,
            ..Finding::new(IdentifierKind::Partition, "aws-cn")
        };
        insta::assert_snapshot!(
            finding.message(None),
            @"Hardcoded AWS partition 'aws-cn' found in ARN. Consider using data.aws_partition.current.partition"
        );
    }

    #[test]
    fn availability_zone_message() {
        let finding = Finding::new(IdentifierKind::AvailabilityZone, "eu-west-1b");
        insta::assert_snapshot!(
            finding.message(Some("subnet")),
            @"Hardcoded AWS availability zone 'eu-west-1b' found in subnet. Consider using data.aws_availability_zones.available.names"
        );
    }

    #[test]
    fn service_principal_message_uses_data_source_name() {
        let finding = Finding::new(IdentifierKind::ServicePrincipal, "ecs-tasks.amazonaws.com")
            .with_service("ecs-tasks");
        insta::assert_snapshot!(
            finding.message(None),
            @"Hardcoded service principal 'ecs-tasks.amazonaws.com' found. Consider using data.aws_service_principal.ecs_tasks.name for multi-partition compatibility"
        );
    }

    #[test]
    fn dns_suffix_message_falls_back_to_data_source() {
        let finding = Finding::new(IdentifierKind::DnsSuffix, "dns_suffix");
        insta::assert_snapshot!(
            finding.message(None),
            @"Service principal uses dns_suffix. Consider using the data.aws_service_principal data source instead for better maintainability"
        );
    }

    #[test]
    fn emitter_fills_rule_metadata() {
        let emitter = Emitter::new("AM003", "aws-iam-policy-hardcoded-region", Severity::Error);
        let finding = Finding::new(IdentifierKind::Region, "eu-west-1");
        let issue = emitter.issue(range(), &finding, Some("IAM policy"));
        assert_eq!(issue.code, "AM003");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(
            issue.suggestion.map(|s| s.message).as_deref(),
            Some("Replace with data.aws_region.current.name")
        );
        assert!(issue.message.contains("found in IAM policy."));
    }
}
