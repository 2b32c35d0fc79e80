//! Destinations for issues.

use crate::types::Issue;

/// Errors returned by a sink that refuses an issue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The sink already holds its maximum number of issues.
    #[error("Issue limit of {limit} reached")]
    LimitReached {
        /// Configured maximum.
        limit: usize,
    },
}

/// Receives issues as checks find them.
pub trait IssueSink {
    /// Accepts one issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink refuses the issue; the check stops.
    fn emit(&mut self, issue: Issue) -> Result<(), SinkError>;
}

/// Stores every issue in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    issues: Vec<Issue>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the issues received so far.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes the sink and returns its issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

impl IssueSink for CollectingSink {
    fn emit(&mut self, issue: Issue) -> Result<(), SinkError> {
        self.issues.push(issue);
        Ok(())
    }
}

/// Forwards to an inner sink until `limit` issues were accepted.
#[derive(Debug)]
pub struct LimitedSink<S> {
    inner: S,
    limit: usize,
    accepted: usize,
}

impl<S: IssueSink> LimitedSink<S> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            limit,
            accepted: 0,
        }
    }

    /// Number of issues accepted.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Returns the wrapped sink.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: IssueSink> IssueSink for LimitedSink<S> {
    fn emit(&mut self, issue: Issue) -> Result<(), SinkError> {
        if self.accepted >= self.limit {
            return Err(SinkError::LimitReached { limit: self.limit });
        }
        self.inner.emit(issue)?;
        self.accepted += 1;
        Ok(())
    }
}
