//! Shared execution of attribute-scoped and whole-tree checks.
//!
//! A rule describes *where* to look with a [`Scope`] and *what* to look for
//! with a list of [`Family`] values; [`run`] does the rest.

use crate::context::{AttributeTarget, CheckContext, ExprRef};
use crate::document::classify;
use crate::emit::{Emitter, Finding};
use crate::eval::{evaluate, Evaluation};
use crate::patterns::{CompiledPattern, PatternSet};
use crate::rule::CheckError;
use crate::sink::IssueSink;
use crate::walker::walk_expressions;
use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;
use tracing::trace;

/// Which expressions a check examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The values of specific attributes, evaluated as a whole.
    Attributes(&'static [AttributeTarget]),
    /// Every expression of the module, parents before children. An
    /// expression whose literal value is scanned claims its span; nested
    /// expressions inside a claimed span are not scanned again.
    WholeTree,
}

/// Filter applied to a literal before scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Scan everything.
    Any,
    /// Scan only values starting with `arn:`.
    ArnPrefixed,
}

impl ValueShape {
    /// Returns true if `text` should be scanned.
    #[must_use]
    pub fn accepts(self, text: &str) -> bool {
        match self {
            Self::Any => true,
            Self::ArnPrefixed => text.starts_with("arn:"),
        }
    }
}

/// A compiled pattern family a check applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// The whole value is a region.
    RegionExact,
    /// A region anywhere in the value.
    RegionEmbedded,
    /// The whole value is an availability zone.
    AvailabilityZone,
    /// A region in the region field of an ARN.
    RegionInArn,
    /// A partition in the partition field of an ARN.
    PartitionInArn,
    /// A `<service>.<dns suffix>` service principal.
    ServicePrincipal,
}

impl Family {
    /// Returns the compiled pattern of this family.
    #[must_use]
    pub fn pattern(self, patterns: &PatternSet) -> &CompiledPattern {
        match self {
            Self::RegionExact => &patterns.region_exact,
            Self::RegionEmbedded => &patterns.region_embedded,
            Self::AvailabilityZone => &patterns.availability_zone,
            Self::RegionInArn => &patterns.region_in_arn,
            Self::PartitionInArn => &patterns.partition_in_arn,
            Self::ServicePrincipal => &patterns.service_principal,
        }
    }
}

/// Everything [`run`] needs to know about a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPlan {
    /// Where to look.
    pub scope: Scope,
    /// Which literals to scan.
    pub shape: ValueShape,
    /// Families to apply, in priority order.
    pub families: &'static [Family],
    /// Where the value lives, for messages (e.g. "IAM role policy").
    pub subject: Option<&'static str>,
}

/// Scans `text` with each family in order.
///
/// Hits of the same identifier kind at the same span count once, credited to
/// the first family that found them. Distinct occurrences are all returned.
#[must_use]
pub fn scan(families: &[Family], patterns: &PatternSet, text: &str) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut findings = Vec::new();
    for family in families {
        let pattern = family.pattern(patterns);
        for hit in pattern.find_all(text) {
            if seen.insert((pattern.kind(), hit.start, hit.end)) {
                findings.push(Finding::from_match(pattern, hit));
            }
        }
    }
    findings
}

/// Executes `plan` against the module of `ctx`.
///
/// # Errors
///
/// Fails if the patterns cannot be compiled, an expression trips an
/// evaluator fault, or the sink refuses an issue.
pub fn run(
    plan: &CheckPlan,
    ctx: &CheckContext<'_>,
    emitter: &Emitter,
    sink: &mut dyn IssueSink,
) -> Result<(), CheckError> {
    let patterns = ctx.patterns.patterns()?;
    let mut runner = PlanRunner {
        plan,
        patterns: &patterns,
        emitter,
        sink,
    };

    match plan.scope {
        Scope::Attributes(targets) => {
            for target in targets {
                for expr in ctx.module.attributes(target) {
                    runner.inspect_value(&expr)?;
                }
            }
            Ok(())
        }
        Scope::WholeTree => {
            let mut claimed: Option<(usize, Range<usize>)> = None;
            walk_expressions(ctx.module, |expr| {
                let span = expr.span();
                if let (Some((file, outer)), Some(inner)) = (&claimed, &span) {
                    if *file == expr.file_index()
                        && outer.start <= inner.start
                        && inner.end <= outer.end
                    {
                        return Ok(());
                    }
                }
                if runner.inspect_value(&expr)? {
                    if let Some(span) = span {
                        claimed = Some((expr.file_index(), span));
                    }
                }
                Ok(())
            })
        }
    }
}

struct PlanRunner<'a> {
    plan: &'a CheckPlan,
    patterns: &'a PatternSet,
    emitter: &'a Emitter,
    sink: &'a mut dyn IssueSink,
}

impl PlanRunner<'_> {
    /// Scans the literal value of `expr`. Returns true if the value was
    /// resolved and accepted by the plan's shape.
    fn inspect_value(&mut self, expr: &ExprRef<'_>) -> Result<bool, CheckError> {
        let text = match evaluate(expr.expr()).map_err(|source| CheckError::Eval {
            range: expr.range(),
            source,
        })? {
            Evaluation::Literal(text) => text,
            Evaluation::Unresolved(reason) => {
                trace!(location = %expr.range(), %reason, "Skipping unresolved expression");
                return Ok(false);
            }
        };

        if !self.plan.shape.accepts(&text) {
            return Ok(false);
        }

        let doc = classify(&text);
        let subject = self.plan.subject.map(|s| {
            if doc.is_structured() {
                Cow::Owned(format!("{s} document"))
            } else {
                Cow::Borrowed(s)
            }
        });

        for finding in scan(self.plan.families, self.patterns, doc.scan_text(&text)) {
            self.emitter
                .emit(self.sink, expr.range(), &finding, subject.as_deref())?;
        }
        Ok(true)
    }
}
