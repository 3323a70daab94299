//! Shared types and constants for the sync engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level content marker: a directory is skill-shaped iff it carries
/// this file at its root.
pub const SKILL_MARKER: &str = "SKILL.md";

/// Sidecar directory holding the sync manifest inside every replica.
pub const SIDECAR_DIR: &str = ".sksync";

/// Manifest file name inside [`SIDECAR_DIR`].
pub const MANIFEST_FILE: &str = "manifest.json";

/// Ownership marker written into every manifest. A directory is mutated
/// or deleted only if its manifest carries this marker and the expected
/// skill id.
pub const MANAGED_BY: &str = "sksync";

/// Reserved owning-location id for the canonical replica. Location ids
/// from configuration must not collide with it.
pub const CANONICAL_TOOL: &str = "canonical";

/// A configured native tool directory that can hold exported replicas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Stable id, referenced by manifests and enablement sets.
    pub id: String,
    /// Human-facing display name.
    pub name: String,
    /// Root under which active replicas live.
    pub active_root: PathBuf,
    /// Root that disabled replicas are moved into.
    pub disabled_root: PathBuf,
}

/// Identifies where content came from (or should come from): the
/// canonical library copy, or one exported location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SourceRef {
    Canonical,
    Location(String),
}

impl SourceRef {
    /// Parse a user-supplied reference: the canonical sentinel or a
    /// location id.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == CANONICAL_TOOL {
            Self::Canonical
        } else {
            Self::Location(raw.to_string())
        }
    }

    /// The owning-location id as persisted in manifests.
    #[must_use]
    pub fn tool_id(&self) -> &str {
        match self {
            Self::Canonical => CANONICAL_TOOL,
            Self::Location(id) => id,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_id())
    }
}

/// One row of a conflict snapshot: a reachable replica at sync time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSnapshot {
    /// Which replica this row describes.
    pub source: SourceRef,
    /// Replica root path.
    pub path: PathBuf,
    /// Content hash at snapshot time.
    pub hash: String,
    /// Whether the hash differs from the baseline recorded in the
    /// canonical manifest.
    pub changed_from_baseline: bool,
}

/// Typed outcome of one `sync_skill` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SyncOutcome {
    /// Nothing diverged and every enabled location already has a replica.
    UpToDate,
    /// Nothing diverged; fresh exports were created for these locations.
    ExportsCreated { locations: Vec<String> },
    /// Exactly one replica changed (or a forced source was given) and its
    /// content now stands everywhere.
    Propagated { source: SourceRef },
    /// Two or more replicas diverged simultaneously. No mutation was
    /// performed; a human picks the winner and feeds it back as a forced
    /// source.
    Conflict { replicas: Vec<ReplicaSnapshot> },
}

impl SyncOutcome {
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
