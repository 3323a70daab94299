//! Error types for sksync.
//!
//! One crate-wide error enum; every fallible operation returns
//! [`Result`]. Engine failures are typed so the coordinator can catch
//! per-skill and keep sweeping.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// The canonical path is a file, not a directory. Archive
    /// materialization is the installer's job and has not happened yet.
    #[error("skill archive not materialized: {} is not a directory", path.display())]
    ArchiveNotMaterialized { path: PathBuf },

    /// The canonical replica is absent or its manifest cannot anchor a sync.
    #[error("canonical replica invalid at {}: {reason}", path.display())]
    CanonicalInvalid { path: PathBuf, reason: String },

    /// An export target exists but is not provably owned by this skill.
    /// Never auto-overwritten.
    #[error("destination {} exists but is not managed for this skill", path.display())]
    UnmanagedDestination { path: PathBuf },

    /// A forced source (or disable target) has no resolvable managed replica.
    #[error("no managed replica for skill {skill_id} at location {location}")]
    MissingManagedExport { skill_id: String, location: String },

    /// Hashing and copying refuse to traverse symlinks (fail-closed).
    #[error("symlink encountered at {}", path.display())]
    SymlinkEncountered { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// Another sweep holds the library lock.
    #[error("sync already running (lock busy at {})", path.display())]
    LockBusy { path: PathBuf },
}

impl SyncError {
    /// Stable machine-readable code for robot-mode output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::ValidationFailed(_) => "validation_failed",
            Self::SkillNotFound(_) => "skill_not_found",
            Self::UnknownLocation(_) => "unknown_location",
            Self::ArchiveNotMaterialized { .. } => "archive_not_materialized",
            Self::CanonicalInvalid { .. } => "canonical_invalid",
            Self::UnmanagedDestination { .. } => "unmanaged_destination",
            Self::MissingManagedExport { .. } => "missing_managed_export",
            Self::SymlinkEncountered { .. } => "symlink_encountered",
            Self::NotADirectory { .. } => "not_a_directory",
            Self::LockBusy { .. } => "lock_busy",
        }
    }
}
