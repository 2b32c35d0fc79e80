//! Whole-tree expression traversal.
//!
//! The traversal reports every expression twice, once on the way down and
//! once on the way back up. [`walk_expressions`] collapses those events with a
//! [`VisitedSet`] so callers observe each physical expression exactly once.

use crate::context::{ExprRef, ModuleContext, SourceFile};
use hcl_edit::expr::Expression;
use hcl_edit::visit::{self, Visit};
use std::collections::HashSet;

/// Traversal phase of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    /// Before the node's children.
    Enter,
    /// After the node's children.
    Exit,
}

/// Identity of an expression within one module, derived from its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    /// Index of the file in its module.
    pub file: usize,
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column (1-indexed).
    pub column: usize,
    /// End byte offset. Separates a node from a child starting at the same
    /// place, such as `a` in `a.b`.
    pub end: usize,
}

impl NodeKey {
    /// Returns the key of `expr`, or `None` if it carries no span.
    #[must_use]
    pub fn of(expr: &ExprRef<'_>) -> Option<Self> {
        let span = expr.span()?;
        let start = expr.file().position(span.start);
        Some(Self {
            file: expr.file_index(),
            line: start.line,
            column: start.column,
            end: span.end,
        })
    }
}

/// Keys of the expressions already handed to a walk callback.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<NodeKey>,
}

impl VisitedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key`, returning true if it was not present.
    pub fn insert(&mut self, key: NodeKey) -> bool {
        self.seen.insert(key)
    }

    /// Returns true if `key` was recorded.
    #[must_use]
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.seen.contains(key)
    }

    /// Number of recorded keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

struct ExprVisitor<'a, F, E> {
    file: &'a SourceFile,
    file_index: usize,
    visited: &'a mut VisitedSet,
    callback: &'a mut F,
    error: Option<E>,
}

impl<F, E> ExprVisitor<'_, F, E>
where
    F: FnMut(ExprRef<'_>) -> Result<(), E>,
{
    fn event(&mut self, event: WalkEvent, node: &Expression) {
        if self.error.is_some() {
            return;
        }
        let expr = ExprRef::new(self.file, self.file_index, node);
        let first_visit = match NodeKey::of(&expr) {
            Some(key) => self.visited.insert(key),
            None => event == WalkEvent::Enter,
        };
        if first_visit {
            if let Err(e) = (self.callback)(expr) {
                self.error = Some(e);
            }
        }
    }
}

impl<F, E> Visit for ExprVisitor<'_, F, E>
where
    F: FnMut(ExprRef<'_>) -> Result<(), E>,
{
    fn visit_expr(&mut self, node: &Expression) {
        self.event(WalkEvent::Enter, node);
        if self.error.is_none() {
            visit::visit_expr(self, node);
        }
        self.event(WalkEvent::Exit, node);
    }
}

/// Calls `callback` once for every expression in every file of `module`,
/// parents before children.
///
/// # Errors
///
/// Stops at and returns the first error from `callback`.
pub fn walk_expressions<F, E>(module: &ModuleContext, mut callback: F) -> Result<(), E>
where
    F: FnMut(ExprRef<'_>) -> Result<(), E>,
{
    let mut visited = VisitedSet::new();
    for (file_index, file) in module.files().iter().enumerate() {
        let mut visitor = ExprVisitor {
            file,
            file_index,
            visited: &mut visited,
            callback: &mut callback,
            error: None,
        };
        visitor.visit_body(file.body());
        if let Some(e) = visitor.error {
            return Err(e);
        }
    }
    tracing::debug!(expressions = visited.len(), "Walked module");
    Ok(())
}
