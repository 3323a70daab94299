//! Sidecar sync manifest.
//!
//! Every replica carries `.sksync/manifest.json`, the sole persisted
//! evidence that a directory belongs to a given skill. It survives
//! arbitrary renames of the containing directory, and the ownership
//! marker plus skill id inside it is the only thing that ever
//! authorizes a destructive operation on the directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::sync::fs::SyncFs;
use crate::sync::types::{CANONICAL_TOOL, MANAGED_BY, MANIFEST_FILE, SIDECAR_DIR};

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Replica identity and sync history, serialized with fixed key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncManifest {
    pub version: u32,
    pub skill_id: String,
    /// Ownership marker; always [`MANAGED_BY`] for directories we own.
    pub managed_by: String,
    pub canonical: bool,
    /// Owning location id, or [`CANONICAL_TOOL`] for the library copy.
    pub tool: String,
    #[serde(with = "sync_timestamp")]
    pub last_sync_at: DateTime<Utc>,
    /// Content hash at last successful sync. Absent only before the
    /// first sync ever recorded for this replica.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_hash: Option<String>,
}

impl SyncManifest {
    /// Manifest for the canonical library replica.
    #[must_use]
    pub fn canonical(skill_id: &str, hash: Option<String>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            skill_id: skill_id.to_string(),
            managed_by: MANAGED_BY.to_string(),
            canonical: true,
            tool: CANONICAL_TOOL.to_string(),
            last_sync_at: Utc::now(),
            last_synced_hash: hash,
        }
    }

    /// Manifest for a replica exported into `tool`'s directory.
    #[must_use]
    pub fn exported(skill_id: &str, tool: &str, hash: String) -> Self {
        Self {
            version: MANIFEST_VERSION,
            skill_id: skill_id.to_string(),
            managed_by: MANAGED_BY.to_string(),
            canonical: false,
            tool: tool.to_string(),
            last_sync_at: Utc::now(),
            last_synced_hash: Some(hash),
        }
    }

    /// True iff this manifest proves ownership of its directory for the
    /// given skill.
    #[must_use]
    pub fn owns(&self, skill_id: &str) -> bool {
        self.managed_by == MANAGED_BY && self.skill_id == skill_id
    }
}

/// Path of the manifest file inside a replica.
#[must_use]
pub fn manifest_path(replica: &Path) -> PathBuf {
    replica.join(SIDECAR_DIR).join(MANIFEST_FILE)
}

/// Load a replica's manifest, `None` if the sidecar is absent.
pub fn load_manifest(fs: &dyn SyncFs, replica: &Path) -> Result<Option<SyncManifest>> {
    let path = manifest_path(replica);
    if !fs.exists(&path)? {
        return Ok(None);
    }
    let raw = fs.read(&path)?;
    let manifest = serde_json::from_slice(&raw).map_err(|err| {
        SyncError::Serialization(format!("manifest {}: {err}", path.display()))
    })?;
    Ok(Some(manifest))
}

/// Persist a replica's manifest atomically (temp file, then rename).
pub fn save_manifest(fs: &dyn SyncFs, manifest: &SyncManifest, replica: &Path) -> Result<()> {
    let path = manifest_path(replica);
    let sidecar = replica.join(SIDECAR_DIR);
    fs.create_dir_all(&sidecar)?;

    let mut body = serde_json::to_string_pretty(manifest)
        .map_err(|err| SyncError::Serialization(format!("manifest encode: {err}")))?;
    body.push('\n');

    let tmp = sidecar.join(format!("{MANIFEST_FILE}.tmp"));
    fs.write(&tmp, body.as_bytes())?;
    fs.rename(&tmp, &path)?;
    Ok(())
}

/// Parse `lastSyncAt`: RFC 3339 first, then the non-fractional legacy
/// encoding.
pub(crate) fn parse_sync_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}

mod sync_timestamp {
    use super::{parse_sync_timestamp, DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_sync_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid lastSyncAt: {raw}")))
    }
}
