//! Skill replica synchronization.
//!
//! Keeps one canonical copy of a skill synchronized across native tool
//! directories: content-addressed change detection, manifest-based
//! ownership, single-writer-wins propagation, explicit conflicts when
//! more than one replica changed, and the export/disable/remove
//! lifecycle.

pub mod digest;
pub mod engine;
pub mod fs;
pub mod manifest;
pub mod ops;
pub mod resolver;
pub mod types;
pub mod walk;

pub use self::digest::{hash_dir, hash_file};
pub use self::engine::{SkillStatus, SyncEngine, SyncRequest};
pub use self::fs::{EntryKind, RealFs, SyncFs};
pub use self::manifest::{
    load_manifest, manifest_path, save_manifest, SyncManifest, MANIFEST_VERSION,
};
pub use self::ops::{disable_skill, export_skill, remove_skill};
pub use self::resolver::{find_replica, find_replicas, is_managed};
pub use self::types::{
    Location, ReplicaSnapshot, SourceRef, SyncOutcome, CANONICAL_TOOL, MANAGED_BY, MANIFEST_FILE,
    SIDECAR_DIR, SKILL_MARKER,
};
pub use self::walk::{Exclusions, Walk, WalkEntry};
