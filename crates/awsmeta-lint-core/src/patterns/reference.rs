//! Reference data: the region, partition and DNS suffix identifiers that the
//! pattern compiler turns into matchers.

use crate::config::ReferenceConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Built-in partition table, embedded at compile time.
const BUILTIN_PARTITIONS: &str = include_str!("../../data/partitions.toml");

/// Which identifier list a [`ReferenceSet`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Region codes such as `us-east-1`.
    Regions,
    /// Partition codes such as `aws-cn`.
    Partitions,
    /// Service principal DNS suffixes such as `amazonaws.com`.
    ServicePrincipalSuffixes,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regions => write!(f, "regions"),
            Self::Partitions => write!(f, "partitions"),
            Self::ServicePrincipalSuffixes => write!(f, "service principal suffixes"),
        }
    }
}

/// Errors loading reference data.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// IO error reading a reference data file.
    #[error("Failed to read reference data {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The reference data is not a valid partition table.
    #[error("Failed to parse reference data: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// The reference list is empty.
    #[error("Reference data contains no {0}")]
    Empty(ReferenceKind),
}

/// An ordered, non-empty, duplicate-free list of identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    kind: ReferenceKind,
    entries: Vec<String>,
}

impl ReferenceSet {
    /// Builds a set from raw identifiers.
    ///
    /// Blank entries are dropped and duplicates keep their first position.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Empty`] if no identifier remains.
    pub fn new<I, S>(kind: ReferenceKind, entries: I) -> Result<Self, ReferenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty() && seen.insert(e.clone()))
            .collect();

        if entries.is_empty() {
            return Err(ReferenceError::Empty(kind));
        }
        Ok(Self { kind, entries })
    }

    /// Returns which list this is.
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Returns the identifiers in their original order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns true if `value` is one of the identifiers.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e == value)
    }
}

/// Provider of the identifier lists.
///
/// Implementations may fail to load; callers must treat a failure or an empty
/// list as fatal rather than falling back to "no identifiers".
pub trait ReferenceData: Send + Sync {
    /// All valid region codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be loaded.
    fn regions(&self) -> Result<Vec<String>, ReferenceError>;

    /// All valid partition codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be loaded.
    fn partitions(&self) -> Result<Vec<String>, ReferenceError>;

    /// DNS suffixes used by service principals across partitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be loaded.
    fn service_principal_suffixes(&self) -> Result<Vec<String>, ReferenceError>;
}

#[derive(Debug, Deserialize)]
struct PartitionTableDto {
    #[serde(default)]
    partition: Vec<PartitionDto>,
}

#[derive(Debug, Deserialize)]
struct PartitionDto {
    id: String,
    #[serde(default)]
    regions: Vec<String>,
    #[serde(default)]
    service_principal_suffixes: Vec<String>,
}

/// In-memory identifier lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    regions: Vec<String>,
    partitions: Vec<String>,
    service_principal_suffixes: Vec<String>,
}

impl ReferenceTable {
    /// Creates a table from explicit lists.
    #[must_use]
    pub fn new(
        regions: Vec<String>,
        partitions: Vec<String>,
        service_principal_suffixes: Vec<String>,
    ) -> Self {
        Self {
            regions,
            partitions,
            service_principal_suffixes,
        }
    }

    /// Returns the table shipped with this crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded table is malformed.
    pub fn builtin() -> Result<Self, ReferenceError> {
        Self::parse(BUILTIN_PARTITIONS)
    }

    /// Parses a partition table in the built-in TOML schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid partition table.
    pub fn parse(content: &str) -> Result<Self, ReferenceError> {
        let dto: PartitionTableDto = toml::from_str(content).map_err(|e| ReferenceError::Parse {
            message: e.to_string(),
        })?;

        let mut table = Self::default();
        for partition in dto.partition {
            table.partitions.push(partition.id);
            table.regions.extend(partition.regions);
            table
                .service_principal_suffixes
                .extend(partition.service_principal_suffixes);
        }
        Ok(table)
    }

    /// Loads a partition table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ReferenceError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReferenceError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Replaces lists that are set in the configuration.
    #[must_use]
    pub fn with_overrides(mut self, config: &ReferenceConfig) -> Self {
        if let Some(regions) = &config.regions {
            self.regions.clone_from(regions);
        }
        if let Some(partitions) = &config.partitions {
            self.partitions.clone_from(partitions);
        }
        if let Some(suffixes) = &config.service_principal_suffixes {
            self.service_principal_suffixes.clone_from(suffixes);
        }
        self
    }
}

impl ReferenceData for ReferenceTable {
    fn regions(&self) -> Result<Vec<String>, ReferenceError> {
        Ok(self.regions.clone())
    }

    fn partitions(&self) -> Result<Vec<String>, ReferenceError> {
        Ok(self.partitions.clone())
    }

    fn service_principal_suffixes(&self) -> Result<Vec<String>, ReferenceError> {
        Ok(self.service_principal_suffixes.clone())
    }
}

/// Reference data read from a partition table file on every request.
#[derive(Debug, Clone)]
pub struct FileReferenceData {
    path: PathBuf,
    overrides: ReferenceConfig,
}

impl FileReferenceData {
    /// Creates a provider backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, overrides: ReferenceConfig) -> Self {
        Self {
            path: path.into(),
            overrides,
        }
    }

    fn load(&self) -> Result<ReferenceTable, ReferenceError> {
        Ok(ReferenceTable::from_file(&self.path)?.with_overrides(&self.overrides))
    }
}

impl ReferenceData for FileReferenceData {
    fn regions(&self) -> Result<Vec<String>, ReferenceError> {
        self.load()?.regions()
    }

    fn partitions(&self) -> Result<Vec<String>, ReferenceError> {
        self.load()?.partitions()
    }

    fn service_principal_suffixes(&self) -> Result<Vec<String>, ReferenceError> {
        self.load()?.service_principal_suffixes()
    }
}

/// Builds the reference data provider described by the configuration.
///
/// # Errors
///
/// Returns an error if the built-in table is malformed.
pub fn from_config(
    config: &ReferenceConfig,
    base_dir: &Path,
) -> Result<Box<dyn ReferenceData>, ReferenceError> {
    if let Some(file) = &config.file {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            base_dir.join(file)
        };
        return Ok(Box::new(FileReferenceData::new(path, config.clone())));
    }
    Ok(Box::new(ReferenceTable::builtin()?.with_overrides(config)))
}
