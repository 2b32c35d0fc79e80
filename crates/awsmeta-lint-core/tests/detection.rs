//! End-to-end tests for the detection engine.
//!
//! Runs a small role-policy rule and an ARN rule against the fixture stack in
//! `tests/fixtures/stack` and against in-memory modules.

use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
use awsmeta_lint_core::patterns::{IdentifierKind, PatternCache, ReferenceTable};
use awsmeta_lint_core::walker::walk_expressions;
use awsmeta_lint_core::{
    Analyzer, AnalyzerError, AttributeTarget, CheckContext, CheckError, Emitter, IssueSink,
    ModuleContext, Rule,
};
use std::convert::Infallible;
use std::path::{Path, PathBuf};

const ROLE_POLICY: &[AttributeTarget] =
    &[AttributeTarget::resource("aws_iam_role_policy", "policy")];

struct RolePolicyRegion;

const ROLE_POLICY_PLAN: CheckPlan = CheckPlan {
    scope: Scope::Attributes(ROLE_POLICY),
    shape: ValueShape::Any,
    families: &[Family::RegionInArn, Family::RegionEmbedded],
    subject: Some("IAM role policy"),
};

impl Rule for RolePolicyRegion {
    fn name(&self) -> &'static str {
        "role-policy-region"
    }
    fn code(&self) -> &'static str {
        "T001"
    }
    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&ROLE_POLICY_PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}

struct ArnMeta;

const ARN_PLAN: CheckPlan = CheckPlan {
    scope: Scope::WholeTree,
    shape: ValueShape::ArnPrefixed,
    families: &[Family::RegionInArn, Family::PartitionInArn],
    subject: None,
};

impl Rule for ArnMeta {
    fn name(&self) -> &'static str {
        "arn-meta"
    }
    fn code(&self) -> &'static str {
        "T002"
    }
    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        engine::run(&ARN_PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
    }
}

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/stack")
}

fn check(rule: impl Rule + 'static, source: &str) -> Vec<awsmeta_lint_core::Issue> {
    let module = ModuleContext::from_sources([("main.tf", source)]).expect("Failed to parse");
    Analyzer::builder()
        .rule(rule)
        .build()
        .expect("Failed to build analyzer")
        .check_module(&module)
        .expect("Failed to check module")
        .issues
}

// ── Fixture stack ──

#[test]
fn fixture_stack_reports_each_hardcoded_region() {
    let result = Analyzer::builder()
        .root(fixture_root())
        .rule(RolePolicyRegion)
        .build()
        .expect("Failed to build analyzer")
        .analyze()
        .expect("Analysis failed");

    // main.tf and modules/queue/main.tf; .terraform and broken.json are skipped
    assert_eq!(result.files_checked, 2);
    assert!(!result.truncated);

    let found: Vec<(String, String)> = result
        .issues
        .iter()
        .map(|i| (i.range.file.display().to_string(), i.message.clone()))
        .collect();
    assert_eq!(found.len(), 5, "unexpected issues: {found:#?}");

    let in_main = found.iter().filter(|(f, _)| f == "main.tf").count();
    assert_eq!(in_main, 3);
    assert!(found
        .iter()
        .filter(|(f, _)| f == "main.tf")
        .all(|(_, m)| m.contains("IAM role policy document")));

    let queue: Vec<&str> = found
        .iter()
        .filter(|(f, _)| f.ends_with("queue/main.tf"))
        .map(|(_, m)| m.as_str())
        .collect();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().any(|m| m.contains("'us-east-1'")));
    assert!(queue.iter().any(|m| m.contains("'eu-west-2'")));
    assert!(found.iter().all(|(_, m)| !m.contains("us-west-2")));
}

#[test]
fn fixture_issues_point_at_owning_expression() {
    let result = Analyzer::builder()
        .root(fixture_root())
        .rule(RolePolicyRegion)
        .build()
        .expect("Failed to build analyzer")
        .analyze()
        .expect("Analysis failed");

    let lines: Vec<usize> = result
        .issues
        .iter()
        .filter(|i| i.range.file == Path::new("main.tf"))
        .map(|i| i.range.start.line)
        .collect();
    assert_eq!(lines, [7, 7, 7]);
}

// ── Properties ──

#[test]
fn traversal_is_idempotent() {
    let module = ModuleContext::from_sources([(
        "main.tf",
        "locals {\n  a = [\"x\", { b = \"arn:aws:s3:::y\" }]\n  c = \"${var.d}-e\"\n}\n",
    )])
    .expect("Failed to parse");

    let collect = || {
        let mut seen = Vec::new();
        walk_expressions(&module, |expr| {
            seen.push((expr.range().start.byte, expr.source_text().map(str::to_string)));
            Ok::<_, Infallible>(())
        })
        .expect("walk is infallible");
        seen
    };

    let first = collect();
    assert!(!first.is_empty());
    assert_eq!(first, collect());
}

#[test]
fn arn_field_precision() {
    let cache = PatternCache::builtin().expect("builtin reference data");
    let patterns = cache.patterns().expect("patterns compile");

    let in_path = "arn:aws:s3:::my-bucket/us-east-1/*";
    assert!(patterns.region_in_arn.find_all(in_path).is_empty());
    assert_eq!(patterns.region_embedded.find_all(in_path).len(), 1);

    let in_field = patterns
        .region_in_arn
        .find_all("arn:aws:ec2:ap-southeast-2:123456789012:instance/i-1");
    assert_eq!(in_field.len(), 1);
    assert_eq!(in_field[0].value, "ap-southeast-2");

    let partition = patterns
        .partition_in_arn
        .find_all("arn:aws-us-gov:iam::123456789012:role/x");
    assert_eq!(partition.len(), 1);
    assert_eq!(partition[0].value, "aws-us-gov");
    assert_eq!(patterns.partition_in_arn.kind(), IdentifierKind::Partition);
}

#[test]
fn nested_principal_is_found_in_document() {
    let source = r#"
resource "aws_iam_role_policy" "trust" {
  policy = jsonencode({
    Statement = [{
      Effect    = "Allow"
      Principal = { AWS = "arn:aws:iam:eu-central-1:123456789012:root" }
    }]
  })
}
"#;
    let issues = check(RolePolicyRegion, source);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("'eu-central-1'"));
}

#[test]
fn unresolved_values_produce_nothing() {
    let source = r#"
resource "aws_iam_role_policy" "p" {
  policy = data.aws_iam_policy_document.p.json
}

resource "aws_iam_role_policy" "q" {
  policy = "arn:${data.aws_partition.current.partition}:s3:::b/${var.region}/*"
}
"#;
    assert!(check(RolePolicyRegion, source).is_empty());
}

#[test]
fn whole_tree_reports_each_occurrence_once() {
    let source = r#"
resource "aws_sns_topic_subscription" "s" {
  topic_arn = "arn:aws:sns:us-west-2:123456789012:topic"
  endpoint  = "arn:aws:sqs:us-west-2:123456789012:${var.queue}"
}
"#;
    let issues = check(ArnMeta, source);
    // The literal ARN carries a region and a partition; the template is dynamic.
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.range.start.line == 3));
}

// ── Whole-tree evaluation ──

#[test]
fn partially_literal_template_is_skipped() {
    let source = r#"
resource "aws_lambda_permission" "p" {
  source_arn = "arn:aws:s3:${var.region}:123456789012:bucket/b"
}
"#;
    assert!(check(ArnMeta, source).is_empty());
}

#[test]
fn composite_expressions_with_literal_values_are_reported() {
    let source = r#"
locals {
  joined   = join(":", ["arn", "aws", "s3", "us-east-1", "1", "x"])
  template = "arn:${"aws"}:s3:us-east-1:1:x"
}
"#;
    let issues = check(ArnMeta, source);
    assert_eq!(issues.len(), 4, "unexpected issues: {issues:#?}");

    let joined: Vec<_> = issues.iter().filter(|i| i.range.start.line == 3).collect();
    assert_eq!(joined.len(), 2);
    assert!(joined.iter().any(|i| i.message.contains("region 'us-east-1'")));
    assert!(joined.iter().any(|i| i.message.contains("partition 'aws'")));
    assert_eq!(issues.iter().filter(|i| i.range.start.line == 4).count(), 2);
}

#[test]
fn whole_tree_issue_covers_owning_expression() {
    let source = "locals {\n  t = \"arn:${\"aws\"}:s3:us-east-1:1:x\"\n}\n";
    let issues = check(ArnMeta, source);
    assert_eq!(issues.len(), 2);
    for issue in &issues {
        assert_eq!(
            &source[issue.range.start.byte..issue.range.end.byte],
            "\"arn:${\"aws\"}:s3:us-east-1:1:x\""
        );
        assert_eq!(issue.range.start.line, 2);
        assert_eq!(issue.range.start.column, 7);
    }
}

// ── Failure modes ──

#[test]
fn empty_region_list_fails_the_run() {
    let err = Analyzer::builder()
        .root(fixture_root())
        .rule(RolePolicyRegion)
        .reference_data(Box::new(ReferenceTable::new(
            Vec::new(),
            vec!["aws".to_string()],
            vec!["amazonaws.com".to_string()],
        )))
        .build()
        .expect("Failed to build analyzer")
        .analyze()
        .expect_err("empty reference data must abort");
    assert!(matches!(err, AnalyzerError::Pattern(_)));
}

#[test]
fn issue_limit_marks_result_truncated() {
    let result = Analyzer::builder()
        .root(fixture_root())
        .rule(RolePolicyRegion)
        .max_issues(2)
        .build()
        .expect("Failed to build analyzer")
        .analyze()
        .expect("Analysis failed");
    assert_eq!(result.issues.len(), 2);
    assert!(result.truncated);
}
