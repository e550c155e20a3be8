// crates/packrun-store-memory/src/store.rs
// ============================================================================
// Module: In-Memory Definition Store
// Description: Versioned definition registry behind a reader/writer lock.
// Purpose: Store validated packs and resolve latest-version reads.
// Dependencies: packrun-core, thiserror
// ============================================================================

//! ## Overview
//! Definitions are stored per pack id in registration order with a parsed
//! version key. A read with no version (or an empty one) resolves to the
//! highest version by numeric `MAJOR.MINOR.PATCH` comparison; a prerelease
//! orders below the corresponding release, and ties fall back to
//! registration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::RwLock;

use packrun_core::DefinitionReadError;
use packrun_core::DefinitionReader;
use packrun_core::PackDefinition;
use packrun_core::runtime::PackValidationError;
use packrun_core::runtime::validate_definition;
use thiserror::Error;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Errors returned by the in-memory definition store.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DefinitionStoreError {
    /// Definition failed schema validation.
    #[error(transparent)]
    Invalid(#[from] PackValidationError),
    /// A definition with the same id and version already exists.
    #[error("automation pack {id} version {version} is already registered")]
    Duplicate {
        /// Pack identifier.
        id: String,
        /// Conflicting version.
        version: String,
    },
    /// Store lock is poisoned.
    #[error("definition store unavailable: lock poisoned")]
    Unavailable,
}

// ============================================================================
// SECTION: Version Keys
// ============================================================================

/// Parsed version key used for latest-version resolution.
///
/// # Invariants
/// - A prerelease orders below the corresponding release.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionKey {
    /// Major version component.
    major: u64,
    /// Minor version component.
    minor: u64,
    /// Patch version component.
    patch: u64,
    /// Prerelease label, when the version carries one.
    prerelease: Option<String>,
}

impl VersionKey {
    /// Parses a validated `MAJOR.MINOR.PATCH(-|+SUFFIX)?` version string.
    fn parse(version: &str) -> Option<Self> {
        let (numeric, prerelease) = match version.split_once('-') {
            Some((numeric, label)) => (numeric, Some(label.to_string())),
            None => (version.split_once('+').map_or(version, |(n, _)| n), None),
        };
        let mut parts = numeric.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => left.cmp(right),
            })
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// One stored definition with its parsed version key.
#[derive(Debug, Clone)]
struct StoredDefinition {
    /// Parsed version key for latest resolution.
    key: VersionKey,
    /// Validated, normalized definition.
    definition: PackDefinition,
}

/// Versioned in-memory definition store.
///
/// # Invariants
/// - Stored definitions are validated and normalized.
/// - At most one definition exists per (id, version) pair.
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    /// Definitions per pack id in registration order.
    inner: RwLock<BTreeMap<String, Vec<StoredDefinition>>>,
}

impl InMemoryDefinitionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates, normalizes, and registers a definition.
    ///
    /// Returns the normalized pack id and version.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionStoreError`] when validation fails, the (id,
    /// version) pair already exists, or the store lock is poisoned.
    pub fn register(
        &self,
        mut definition: PackDefinition,
    ) -> Result<(String, String), DefinitionStoreError> {
        validate_definition(&mut definition)?;
        let id = definition.metadata.id.clone();
        let version = definition.metadata.version.clone();
        let key = VersionKey::parse(&version).ok_or_else(|| {
            DefinitionStoreError::Invalid(PackValidationError {
                issues: vec![format!("metadata.version \"{version}\" is not parseable")],
            })
        })?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| DefinitionStoreError::Unavailable)?;
        let entries = inner.entry(id.clone()).or_default();
        if entries
            .iter()
            .any(|entry| entry.definition.metadata.version == version)
        {
            return Err(DefinitionStoreError::Duplicate { id, version });
        }
        entries.push(StoredDefinition { key, definition });
        drop(inner);
        Ok((id, version))
    }
}

impl DefinitionReader for InMemoryDefinitionStore {
    fn get(&self, id: &str, version: Option<&str>) -> Result<PackDefinition, DefinitionReadError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| DefinitionReadError::Store("store lock poisoned".to_string()))?;
        let entries = inner
            .get(id)
            .ok_or_else(|| DefinitionReadError::NotFound(id.to_string()))?;

        let wanted = version.filter(|wanted| !wanted.is_empty());
        let found = match wanted {
            Some(wanted) => entries
                .iter()
                .find(|entry| entry.definition.metadata.version == wanted),
            None => entries.iter().max_by(|left, right| left.key.cmp(&right.key)),
        };
        found.map(|entry| entry.definition.clone()).ok_or_else(|| {
            DefinitionReadError::NotFound(format!(
                "{id}@{}",
                wanted.unwrap_or("latest")
            ))
        })
    }
}
