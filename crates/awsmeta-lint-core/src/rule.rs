//! Rule trait for defining lint rules.

use crate::context::CheckContext;
use crate::eval::EvalError;
use crate::patterns::PatternError;
use crate::sink::{IssueSink, SinkError};
use crate::types::{Severity, SourceRange};

/// Errors that abort a rule's check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The compiled patterns are unavailable.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The evaluator hit a fault.
    #[error("Failed to evaluate expression at {range}: {source}")]
    Eval {
        /// Expression that failed.
        range: SourceRange,
        /// Evaluator fault.
        #[source]
        source: EvalError,
    },

    /// The sink refused an issue.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// A lint rule run once per module.
///
/// Most rules describe themselves with a [`CheckPlan`](crate::engine::CheckPlan)
/// and delegate to [`engine::run`](crate::engine::run).
///
/// # Example
///
/// ```ignore
/// use awsmeta_lint_core::engine::{self, CheckPlan, Family, Scope, ValueShape};
/// use awsmeta_lint_core::{CheckContext, CheckError, Emitter, IssueSink, Rule};
///
/// pub struct NoHardcodedArns;
///
/// const PLAN: CheckPlan = CheckPlan {
///     scope: Scope::WholeTree,
///     shape: ValueShape::ArnPrefixed,
///     families: &[Family::PartitionInArn],
///     subject: None,
/// };
///
/// impl Rule for NoHardcodedArns {
///     fn name(&self) -> &'static str { "no-hardcoded-arns" }
///     fn code(&self) -> &'static str { "X001" }
///
///     fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError> {
///         engine::run(&PLAN, ctx, &Emitter::for_rule(self, ctx.severity), sink)
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "aws-meta-hardcoded").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AM006").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for issues from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Whether the rule runs without being enabled explicitly.
    fn enabled_by_default(&self) -> bool {
        true
    }

    /// Documentation link, if any.
    fn link(&self) -> Option<&'static str> {
        None
    }

    /// Checks one module, sending issues to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if patterns cannot be compiled, the evaluator faults,
    /// or the sink refuses an issue.
    fn check(&self, ctx: &CheckContext<'_>, sink: &mut dyn IssueSink) -> Result<(), CheckError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
