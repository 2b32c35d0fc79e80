//! Compiles reference sets into text matchers.

use super::reference::{ReferenceKind, ReferenceSet};
use super::PatternError;
use regex::Regex;

/// ARN field a pattern is anchored to.
///
/// ARN grammar: `arn:<partition>:<service>:<region>:<account>:<resource>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArnField {
    /// Second field.
    Partition,
    /// Fourth field.
    Region,
}

/// How a compiled pattern matches text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternMode {
    /// The whole text equals one identifier.
    Exact,
    /// An identifier occurs anywhere in the text.
    Embedded,
    /// The whole text is a region code followed by one zone letter.
    AvailabilityZone,
    /// An identifier occupies the given field of an ARN.
    InArn(ArnField),
    /// `<service>.<suffix>` where the suffix is one of the identifiers.
    ServicePrincipal,
}

impl std::fmt::Display for PatternMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Embedded => write!(f, "embedded"),
            Self::AvailabilityZone => write!(f, "availability-zone"),
            Self::InArn(ArnField::Partition) => write!(f, "partition-in-arn"),
            Self::InArn(ArnField::Region) => write!(f, "region-in-arn"),
            Self::ServicePrincipal => write!(f, "service-principal"),
        }
    }
}

/// Kind of hardcoded identifier a match represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKind {
    /// A region code.
    Region,
    /// A partition code.
    Partition,
    /// An availability zone name.
    AvailabilityZone,
    /// A service principal hostname.
    ServicePrincipal,
    /// A service principal assembled from a partition DNS suffix.
    DnsSuffix,
}

impl IdentifierKind {
    /// Human-readable name used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Partition => "partition",
            Self::AvailabilityZone => "availability zone",
            Self::ServicePrincipal => "service principal",
            Self::DnsSuffix => "DNS suffix",
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single pattern hit inside a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// The matched identifier (or the full `<service>.<suffix>` principal).
    pub value: String,
    /// Byte offset of `value` in the scanned text.
    pub start: usize,
    /// Byte offset just past `value`.
    pub end: usize,
    /// Service name for service principal matches.
    pub service: Option<String>,
}

/// Immutable matcher built from a [`ReferenceSet`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    mode: PatternMode,
    kind: IdentifierKind,
    regex: Regex,
}

impl CompiledPattern {
    /// Returns the matching mode.
    #[must_use]
    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// Returns the identifier kind this pattern reports.
    #[must_use]
    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Returns the regular expression source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns every non-overlapping match in `text`, left to right.
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<PatternMatch> {
        match self.mode {
            PatternMode::Exact | PatternMode::Embedded | PatternMode::AvailabilityZone => self
                .regex
                .find_iter(text)
                .map(|m| PatternMatch {
                    value: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                    service: None,
                })
                .collect(),
            PatternMode::InArn(_) => self
                .regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| PatternMatch {
                    value: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                    service: None,
                })
                .collect(),
            PatternMode::ServicePrincipal => self
                .regex
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let service = caps.get(1)?;
                    Some(PatternMatch {
                        value: whole.as_str().to_string(),
                        start: whole.start(),
                        end: whole.end(),
                        service: Some(service.as_str().to_string()),
                    })
                })
                .collect(),
        }
    }
}

/// Compiles `set` into a matcher for `mode`.
///
/// Every identifier is escaped and the alternation is ordered longest first,
/// so `aws` never shadows `aws-us-gov`.
///
/// # Errors
///
/// Returns an error if the mode does not fit the set (for example a region
/// set compiled for the partition ARN field) or if the regex cannot be built.
pub fn compile(set: &ReferenceSet, mode: PatternMode) -> Result<CompiledPattern, PatternError> {
    let kind = match (set.kind(), mode) {
        (ReferenceKind::Regions, PatternMode::Exact | PatternMode::Embedded)
        | (ReferenceKind::Regions, PatternMode::InArn(ArnField::Region)) => IdentifierKind::Region,
        (ReferenceKind::Regions, PatternMode::AvailabilityZone) => IdentifierKind::AvailabilityZone,
        (ReferenceKind::Partitions, PatternMode::Exact | PatternMode::Embedded)
        | (ReferenceKind::Partitions, PatternMode::InArn(ArnField::Partition)) => {
            IdentifierKind::Partition
        }
        (ReferenceKind::ServicePrincipalSuffixes, PatternMode::ServicePrincipal) => {
            IdentifierKind::ServicePrincipal
        }
        (reference, mode) => return Err(PatternError::ModeMismatch { reference, mode }),
    };

    let alternation = alternation(set);
    let source = match mode {
        PatternMode::Exact => format!("^(?:{alternation})$"),
        PatternMode::Embedded => format!("(?:{alternation})"),
        PatternMode::AvailabilityZone => format!("^(?:{alternation})[a-z]$"),
        PatternMode::InArn(ArnField::Region) => {
            format!(r#"\barn:[^:\s"]+:[^:\s"]+:({alternation}):"#)
        }
        PatternMode::InArn(ArnField::Partition) => format!(r"\barn:({alternation}):"),
        PatternMode::ServicePrincipal => format!(r"\b([a-z0-9-]+)\.({alternation})\b"),
    };

    tracing::debug!(%mode, entries = set.entries().len(), "Compiling pattern");

    Ok(CompiledPattern {
        mode,
        kind,
        regex: Regex::new(&source)?,
    })
}

fn alternation(set: &ReferenceSet) -> String {
    let mut entries: Vec<&String> = set.entries().iter().collect();
    entries.sort_by(|a, b| b.len().cmp(&a.len()));
    entries
        .into_iter()
        .map(|e| regex::escape(e))
        .collect::<Vec<_>>()
        .join("|")
}
