//! Rule to flag service principals assembled from `dns_suffix`.
//!
//! `"s3.${data.aws_partition.current.dns_suffix}"` works in most partitions
//! but not for every service. The `aws_service_principal` data source knows
//! the exceptions.
//!
//! Only string templates that cannot be evaluated are inspected; their source
//! text is matched for `<service>.${<ref>.dns_suffix}`.

use awsmeta_lint_core::eval::{evaluate, Evaluation};
use awsmeta_lint_core::patterns::IdentifierKind;
use awsmeta_lint_core::walker::walk_expressions;
use awsmeta_lint_core::{
    CheckContext, CheckError, Emitter, ExprKind, ExprRef, Finding, IssueSink, Rule,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Rule code for aws-service-principal-dns-suffix.
pub const CODE: &str = "AM008";

/// Rule name for aws-service-principal-dns-suffix.
pub const NAME: &str = "aws-service-principal-dns-suffix";

/// `${<ref>.dns_suffix}`, optionally preceded by `<service>.`.
#[allow(clippy::expect_used)]
static DNS_SUFFIX_PRINCIPAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:([a-z0-9\-]+)\.)?\$\{[^}]*\.dns_suffix\}").expect("valid dns_suffix regex")
});

/// Flags `<service>.${...dns_suffix}` service principals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsServicePrincipalDnsSuffix;

impl AwsServicePrincipalDnsSuffix {
    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the findings for one template's source text.
    fn findings(source: &str) -> Vec<Finding> {
        let mut referenced = false;
        let mut findings = Vec::new();
        for caps in DNS_SUFFIX_PRINCIPAL.captures_iter(source) {
            referenced = true;
            if let (Some(whole), Some(service)) = (caps.get(0), caps.get(1)) {
                findings.push(
                    Finding::new(IdentifierKind::DnsSuffix, whole.as_str())
                        .with_service(service.as_str()),
                );
            }
        }

        if referenced && findings.is_empty() {
            debug!(source, "dns_suffix reference without a service name");
            findings.push(Finding::new(IdentifierKind::DnsSuffix, "dns_suffix"));
        }
        findings
    }

    fn inspect(
        expr: &ExprRef<'_>,
        emitter: &Emitter,
        sink: &mut dyn IssueSink,
    ) -> Result<(), CheckError> {
        if !matches!(expr.kind(), ExprKind::Template | ExprKind::Heredoc) || expr.is_leaf() {
            return Ok(());
        }

        let evaluation = evaluate(expr.expr()).map_err(|source| CheckError::Eval {
            range: expr.range(),
            source,
        })?;
        if let Evaluation::Literal(_) = evaluation {
            return Ok(());
        }

        let Some(source) = expr.source_text() else {
            return Ok(());
        };

        for finding in Self::findings(source) {
            emitter.emit(sink, expr.range(), &finding, None)?;
        }
        Ok(())
    }
}

impl Rule for AwsServicePrincipalDnsSuffix {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags service principals built from dns_suffix"
    }

    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
        let emitter = Emitter::for_rule(self, ctx.severity);
        walk_expressions(ctx.module, |expr| Self::inspect(&expr, &emitter, sink))
    }
}
