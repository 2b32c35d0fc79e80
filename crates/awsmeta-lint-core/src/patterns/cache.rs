//! Process-scoped cache of compiled patterns.

use super::compiler::{compile, ArnField, CompiledPattern, PatternMode};
use super::reference::{ReferenceData, ReferenceError, ReferenceKind, ReferenceSet, ReferenceTable};
use super::PatternError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Every pattern family the checks draw from.
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Full-string region match.
    pub region_exact: CompiledPattern,
    /// Region anywhere in a text.
    pub region_embedded: CompiledPattern,
    /// Full-string availability zone match.
    pub availability_zone: CompiledPattern,
    /// Region in the region field of an ARN.
    pub region_in_arn: CompiledPattern,
    /// Partition in the partition field of an ARN.
    pub partition_in_arn: CompiledPattern,
    /// `<service>.<dns suffix>` service principals.
    pub service_principal: CompiledPattern,
}

impl PatternSet {
    /// Loads the reference lists from `data` and compiles every family.
    ///
    /// # Errors
    ///
    /// Fails if the data cannot be loaded or any list is empty.
    pub fn compile(data: &dyn ReferenceData) -> Result<Self, PatternError> {
        Self::from_sets(&ReferenceSets::load(data)?)
    }

    fn from_sets(sets: &ReferenceSets) -> Result<Self, PatternError> {
        Ok(Self {
            region_exact: compile(&sets.regions, PatternMode::Exact)?,
            region_embedded: compile(&sets.regions, PatternMode::Embedded)?,
            availability_zone: compile(&sets.regions, PatternMode::AvailabilityZone)?,
            region_in_arn: compile(&sets.regions, PatternMode::InArn(ArnField::Region))?,
            partition_in_arn: compile(&sets.partitions, PatternMode::InArn(ArnField::Partition))?,
            service_principal: compile(&sets.suffixes, PatternMode::ServicePrincipal)?,
        })
    }
}

struct ReferenceSets {
    regions: ReferenceSet,
    partitions: ReferenceSet,
    suffixes: ReferenceSet,
}

impl ReferenceSets {
    fn load(data: &dyn ReferenceData) -> Result<Self, ReferenceError> {
        Ok(Self {
            regions: ReferenceSet::new(ReferenceKind::Regions, data.regions()?)?,
            partitions: ReferenceSet::new(ReferenceKind::Partitions, data.partitions()?)?,
            suffixes: ReferenceSet::new(
                ReferenceKind::ServicePrincipalSuffixes,
                data.service_principal_suffixes()?,
            )?,
        })
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.regions.entries().hash(&mut hasher);
        self.partitions.entries().hash(&mut hasher);
        self.suffixes.entries().hash(&mut hasher);
        hasher.finish()
    }
}

/// Compiled patterns shared by every check of an analysis run.
///
/// The set is rebuilt when the reference lists change and can be dropped
/// explicitly with [`PatternCache::invalidate`].
pub struct PatternCache {
    data: Box<dyn ReferenceData>,
    compiled: RwLock<Option<(u64, Arc<PatternSet>)>>,
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("cached", &self.is_cached())
            .finish_non_exhaustive()
    }
}

impl PatternCache {
    /// Creates an empty cache over `data`.
    #[must_use]
    pub fn new(data: Box<dyn ReferenceData>) -> Self {
        Self {
            data,
            compiled: RwLock::new(None),
        }
    }

    /// Creates a cache over the built-in partition table.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded table is malformed.
    pub fn builtin() -> Result<Self, ReferenceError> {
        Ok(Self::new(Box::new(ReferenceTable::builtin()?)))
    }

    /// Returns the compiled patterns, compiling them on first use or when the
    /// reference lists changed since the last call.
    ///
    /// # Errors
    ///
    /// Fails if the reference data cannot be loaded or any list is empty.
    pub fn patterns(&self) -> Result<Arc<PatternSet>, PatternError> {
        let sets = ReferenceSets::load(self.data.as_ref())?;
        let fingerprint = sets.fingerprint();

        if let Some((cached, set)) = self.compiled.read().ok().as_deref().and_then(Option::as_ref)
        {
            if *cached == fingerprint {
                return Ok(Arc::clone(set));
            }
            debug!("Reference data changed, recompiling patterns");
        }

        let set = Arc::new(PatternSet::from_sets(&sets)?);
        if let Ok(mut guard) = self.compiled.write() {
            *guard = Some((fingerprint, Arc::clone(&set)));
        }
        Ok(set)
    }

    /// Drops the compiled patterns.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.compiled.write() {
            *guard = None;
        }
    }

    /// Returns true if a compiled set is held.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.compiled
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}
