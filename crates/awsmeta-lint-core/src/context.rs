//! Parsed Terraform modules and the views rules read from them.

use crate::patterns::PatternCache;
use crate::types::{Position, Severity, SourceRange};
use hcl_edit::expr::Expression;
use hcl_edit::structure::{Block, BlockLabel, Body, Structure};
use hcl_edit::template::{Element, Template};
use hcl_edit::Span;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A `.tf` file that failed to parse.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Parse error in {path}: {message}")]
pub struct ParseError {
    /// Path of the file.
    pub path: PathBuf,
    /// Parser message.
    pub message: String,
}

/// A parsed configuration file.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
    body: Body,
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Parses `content` as HCL.
    ///
    /// `path` is used for reporting only and is usually relative to the
    /// analysis root.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid HCL.
    pub fn parse(path: impl Into<PathBuf>, content: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let content = content.into();
        let body = hcl_edit::parser::parse_body(&content).map_err(|e| ParseError {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Ok(Self {
            path,
            content,
            body,
            line_starts,
        })
    }

    /// Returns the reporting path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file contents.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the parsed body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Converts a byte offset into a line/column position.
    ///
    /// Offsets past the end are clamped to the end of the file.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts.get(line.saturating_sub(1)).copied().unwrap_or(0);
        let column = self
            .content
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count())
            + 1;
        Position::new(line.max(1), column, offset)
    }

    /// Converts a byte span into a source range.
    #[must_use]
    pub fn range(&self, span: Range<usize>) -> SourceRange {
        SourceRange::new(
            self.path.clone(),
            self.position(span.start),
            self.position(span.end),
        )
    }
}

/// Identifies attributes inside top-level blocks.
///
/// `resource "aws_iam_policy" "x" { policy = ... }` is
/// `AttributeTarget::resource("aws_iam_policy", "policy")`, and
/// `provider "aws" { assume_role { role_arn = ... } }` is
/// `AttributeTarget::provider("aws", "role_arn").within("assume_role")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeTarget {
    /// Top-level block type (`resource`, `provider`).
    pub block: &'static str,
    /// First label of the block (resource type or provider name).
    pub label: &'static str,
    /// Nested block type holding the attribute, if any.
    pub nested: Option<&'static str>,
    /// Attribute name.
    pub attribute: &'static str,
}

impl AttributeTarget {
    /// Targets an attribute of a `resource "<resource_type>"` block.
    #[must_use]
    pub const fn resource(resource_type: &'static str, attribute: &'static str) -> Self {
        Self {
            block: "resource",
            label: resource_type,
            nested: None,
            attribute,
        }
    }

    /// Targets an attribute of a `provider "<name>"` block.
    #[must_use]
    pub const fn provider(name: &'static str, attribute: &'static str) -> Self {
        Self {
            block: "provider",
            label: name,
            nested: None,
            attribute,
        }
    }

    /// Moves the attribute into a nested block of the given type.
    #[must_use]
    pub const fn within(mut self, nested: &'static str) -> Self {
        self.nested = Some(nested);
        self
    }

    fn matches_block(&self, block: &Block) -> bool {
        block.ident.as_str() == self.block
            && block.labels.first().map(label_str) == Some(self.label)
    }
}

impl std::fmt::Display for AttributeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} \"{}\"", self.block, self.label)?;
        if let Some(nested) = self.nested {
            write!(f, " {nested}")?;
        }
        write!(f, ".{}", self.attribute)
    }
}

fn label_str(label: &BlockLabel) -> &str {
    match label {
        BlockLabel::String(s) => s.value().as_str(),
        BlockLabel::Ident(ident) => ident.as_str(),
    }
}

fn blocks<'a>(body: &'a Body, ident: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
    body.iter()
        .filter_map(Structure::as_block)
        .filter(move |block| block.ident.as_str() == ident)
}

fn attribute<'a>(body: &'a Body, key: &str) -> Option<&'a Expression> {
    body.iter()
        .filter_map(Structure::as_attribute)
        .find(|attr| attr.key.as_str() == key)
        .map(|attr| &attr.value)
}

/// All configuration files of one directory.
#[derive(Debug, Default)]
pub struct ModuleContext {
    dir: PathBuf,
    files: Vec<SourceFile>,
}

impl ModuleContext {
    /// Creates an empty module for `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Parses `(path, content)` pairs into a module.
    ///
    /// # Errors
    ///
    /// Returns the first parse error.
    pub fn from_sources<P, C>(sources: impl IntoIterator<Item = (P, C)>) -> Result<Self, ParseError>
    where
        P: Into<PathBuf>,
        C: Into<String>,
    {
        let mut module = Self::default();
        for (path, content) in sources {
            module.push(SourceFile::parse(path, content)?);
        }
        Ok(module)
    }

    /// Adds a parsed file.
    pub fn push(&mut self, file: SourceFile) {
        self.files.push(file);
    }

    /// Returns the module directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the files in load order.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Returns true if the module holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns every expression assigned to `target`, in file order.
    #[must_use]
    pub fn attributes(&self, target: &AttributeTarget) -> Vec<ExprRef<'_>> {
        let mut found = Vec::new();
        for (file_index, file) in self.files.iter().enumerate() {
            for block in blocks(file.body(), target.block).filter(|b| target.matches_block(b)) {
                let exprs: Vec<&Expression> = match target.nested {
                    None => attribute(&block.body, target.attribute).into_iter().collect(),
                    Some(nested) => blocks(&block.body, nested)
                        .filter_map(|inner| attribute(&inner.body, target.attribute))
                        .collect(),
                };
                found.extend(exprs.into_iter().map(|expr| ExprRef::new(file, file_index, expr)));
            }
        }
        found
    }
}

/// Broad syntactic category of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Numeric literal.
    Number,
    /// Quoted string without interpolation.
    String,
    /// Tuple.
    Array,
    /// Object.
    Object,
    /// Quoted string with template elements.
    Template,
    /// Heredoc.
    Heredoc,
    /// Parenthesized expression.
    Parenthesis,
    /// Bare identifier.
    Variable,
    /// `a ? b : c`
    Conditional,
    /// Function call.
    FuncCall,
    /// Attribute or index traversal.
    Traversal,
    /// Unary operation.
    UnaryOp,
    /// Binary operation.
    BinaryOp,
    /// `for` expression.
    For,
}

/// A borrowed expression together with the file it lives in.
#[derive(Debug, Clone, Copy)]
pub struct ExprRef<'a> {
    file: &'a SourceFile,
    file_index: usize,
    expr: &'a Expression,
}

impl<'a> ExprRef<'a> {
    /// Wraps `expr` from `file`.
    #[must_use]
    pub fn new(file: &'a SourceFile, file_index: usize, expr: &'a Expression) -> Self {
        Self {
            file,
            file_index,
            expr,
        }
    }

    /// Returns the underlying expression.
    #[must_use]
    pub fn expr(&self) -> &'a Expression {
        self.expr
    }

    /// Returns the file holding the expression.
    #[must_use]
    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// Returns the index of the file within its module.
    #[must_use]
    pub fn file_index(&self) -> usize {
        self.file_index
    }

    /// Returns the byte span, if the parser recorded one.
    #[must_use]
    pub fn span(&self) -> Option<Range<usize>> {
        self.expr.span()
    }

    /// Returns the source range. Expressions without a span map to the
    /// start of the file.
    #[must_use]
    pub fn range(&self) -> SourceRange {
        self.file.range(self.span().unwrap_or_default())
    }

    /// Returns the raw source text of the expression.
    #[must_use]
    pub fn source_text(&self) -> Option<&'a str> {
        self.span().and_then(|span| self.file.content().get(span))
    }

    /// Returns the syntactic category.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        match self.expr {
            Expression::Null(_) => ExprKind::Null,
            Expression::Bool(_) => ExprKind::Bool,
            Expression::Number(_) => ExprKind::Number,
            Expression::String(_) => ExprKind::String,
            Expression::Array(_) => ExprKind::Array,
            Expression::Object(_) => ExprKind::Object,
            Expression::StringTemplate(_) => ExprKind::Template,
            Expression::HeredocTemplate(_) => ExprKind::Heredoc,
            Expression::Parenthesis(_) => ExprKind::Parenthesis,
            Expression::Variable(_) => ExprKind::Variable,
            Expression::Conditional(_) => ExprKind::Conditional,
            Expression::FuncCall(_) => ExprKind::FuncCall,
            Expression::Traversal(_) => ExprKind::Traversal,
            Expression::UnaryOp(_) => ExprKind::UnaryOp,
            Expression::BinaryOp(_) => ExprKind::BinaryOp,
            Expression::ForExpr(_) => ExprKind::For,
        }
    }

    /// Returns the template body for string templates and heredocs.
    #[must_use]
    pub fn template(&self) -> Option<&'a Template> {
        match self.expr {
            Expression::StringTemplate(t) => Some(&**t),
            Expression::HeredocTemplate(h) => Some(&h.template),
            _ => None,
        }
    }

    /// Returns true if the expression has no child expressions.
    ///
    /// Templates count as leaves only when every element is literal text.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        match self.kind() {
            ExprKind::Null
            | ExprKind::Bool
            | ExprKind::Number
            | ExprKind::String
            | ExprKind::Variable => true,
            ExprKind::Template | ExprKind::Heredoc => self
                .template()
                .is_some_and(|t| t.iter().all(|e| matches!(e, Element::Literal(_)))),
            _ => false,
        }
    }
}

/// Everything a rule sees while checking one module.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The module under check.
    pub module: &'a ModuleContext,
    /// Compiled patterns for this run.
    pub patterns: &'a PatternCache,
    /// Effective severity of the rule being run.
    pub severity: Severity,
}

impl<'a> CheckContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(module: &'a ModuleContext, patterns: &'a PatternCache, severity: Severity) -> Self {
        Self {
            module,
            patterns,
            severity,
        }
    }
}
