//! # awsmeta-lint-core
//!
//! Detection engine for hardcoded AWS identifiers in Terraform configuration.
//!
//! Region codes, partition codes and service principal hostnames written as
//! literals tie a configuration to one partition. This crate finds them:
//!
//! - [`patterns`] compiles reference lists into matchers and caches them
//! - [`walker`] visits every expression of a module exactly once
//! - [`eval`] reduces expressions to literals where no runtime input is needed
//! - [`document`] canonicalizes embedded JSON documents before scanning
//! - [`engine`] runs attribute-scoped and whole-tree checks
//! - [`Analyzer`] discovers `.tf` files and runs [`Rule`]s over each module
//!
//! ## Example
//!
//! ```ignore
//! use awsmeta_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./infra")
//!     .rule(MyRule)
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for issue in &result.issues {
//!     println!("{issue}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod emit;
mod rule;
mod sink;
mod types;

pub mod document;
pub mod engine;
pub mod eval;
pub mod patterns;
pub mod walker;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, ReferenceConfig, RuleConfig};
pub use context::{
    AttributeTarget, CheckContext, ExprKind, ExprRef, ModuleContext, ParseError,
    SourceFile,
};
pub use emit::{Emitter, Finding};
pub use rule::{CheckError, Rule, RuleBox};
pub use sink::{CollectingSink, IssueSink, LimitedSink, SinkError};
pub use types::{
    Issue, IssueDiagnostic, LintResult, Position, Severity, SourceRange, Suggestion,
};
