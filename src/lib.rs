//! sksync - keep one canonical skill library synchronized across
//! native tool directories.
//!
//! The core is [`sync`]: content-addressed change detection, a
//! persisted sidecar manifest per replica, single-writer-wins
//! propagation, explicit conflicts when more than one replica changed
//! between passes, and the export/disable/remove lifecycle. [`library`]
//! is the caller side: discovery, the serialized sweep, and the
//! advisory lock. A directory is mutated or deleted only if its
//! manifest proves ownership for the expected skill id.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod security;
pub mod sync;
pub mod test_utils;

pub use error::{Result, SyncError};
pub use sync::engine::{SkillStatus, SyncEngine, SyncRequest};
pub use sync::types::{Location, ReplicaSnapshot, SourceRef, SyncOutcome};
