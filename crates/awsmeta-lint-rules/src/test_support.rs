//! Helpers shared by rule tests.

use awsmeta_lint_core::patterns::PatternCache;
use awsmeta_lint_core::{CheckContext, CollectingSink, Issue, ModuleContext, Rule};

/// Runs `rule` over a single-file module and returns its issues in emit order.
pub(crate) fn check(rule: &dyn Rule, source: &str) -> Vec<Issue> {
    let module = ModuleContext::from_sources([("main.tf", source)]).expect("fixture should parse");
    let cache = PatternCache::builtin().expect("builtin reference data");
    let ctx = CheckContext::new(&module, &cache, rule.default_severity());
    let mut sink = CollectingSink::new();
    rule.check(&ctx, &mut sink).expect("check should succeed");
    sink.into_issues()
}
