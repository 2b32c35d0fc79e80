//! Reference data and the compiled matchers built from it.

mod cache;
mod compiler;
mod reference;

pub use cache::{PatternCache, PatternSet};
pub use compiler::{
    compile, ArnField, CompiledPattern, IdentifierKind, PatternMatch, PatternMode,
};
pub use reference::{
    from_config, FileReferenceData, ReferenceData, ReferenceError, ReferenceKind, ReferenceSet,
    ReferenceTable,
};

/// Errors building compiled patterns.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Reference data could not be loaded or was empty.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// The generated regular expression was rejected.
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The mode does not apply to the reference list.
    #[error("Pattern mode {mode} does not apply to {reference}")]
    ModeMismatch {
        /// The reference list given.
        reference: ReferenceKind,
        /// The requested mode.
        mode: PatternMode,
    },
}
