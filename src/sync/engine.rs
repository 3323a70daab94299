//! The synchronization protocol.
//!
//! One `sync_skill` invocation processes exactly one skill; the engine
//! holds no state between calls. Divergence is computed per replica
//! against the baseline recorded in the canonical manifest, never
//! pairwise: two replicas that independently arrived at identical
//! content still conflict.
//!
//! The caller must not run the engine concurrently for the same
//! (skill id, location) pair. Different skill ids share no mutable
//! state. Propagation across multiple locations is not transactional;
//! an interrupted run is healed by the next invocation, which recomputes
//! hashes and re-propagates.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::sync::digest::hash_dir;
use crate::sync::fs::{EntryKind, RealFs, SyncFs};
use crate::sync::manifest::{load_manifest, save_manifest, SyncManifest};
use crate::sync::ops::{self, replace_dir_contents};
use crate::sync::resolver::find_replica;
use crate::sync::types::{
    Location, ReplicaSnapshot, SourceRef, SyncOutcome, CANONICAL_TOOL,
};
use crate::sync::walk::Exclusions;

/// Everything one sync pass needs to know about one skill.
#[derive(Debug, Clone)]
pub struct SyncRequest<'a> {
    pub skill_id: &'a str,
    pub preferred_name: &'a str,
    pub canonical_dir: &'a Path,
    /// Ids of locations this skill is enabled for.
    pub enabled: &'a [String],
    /// All configured locations; enabled ids must resolve here.
    pub locations: &'a [Location],
    /// Manual override after a human resolved a prior conflict.
    pub force_source: Option<SourceRef>,
}

/// Read-only divergence report for one skill (no seeding, no mutation).
#[derive(Debug, Clone)]
pub struct SkillStatus {
    /// Baseline hash from the canonical manifest, if one exists yet.
    pub baseline: Option<String>,
    pub replicas: Vec<ReplicaSnapshot>,
    /// Enabled locations with no replica.
    pub missing: Vec<String>,
}

struct LocationState<'a> {
    location: &'a Location,
    replica: Option<PathBuf>,
    hash: Option<String>,
}

/// Stateless orchestrator over an injected filesystem.
pub struct SyncEngine<'f> {
    fs: &'f dyn SyncFs,
}

impl SyncEngine<'static> {
    #[must_use]
    pub fn new() -> Self {
        Self { fs: &RealFs }
    }
}

impl Default for SyncEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'f> SyncEngine<'f> {
    #[must_use]
    pub fn with_fs(fs: &'f dyn SyncFs) -> Self {
        Self { fs }
    }

    /// Run the full protocol for one skill: baseline comparison,
    /// divergence detection, conflict construction, winner propagation.
    pub fn sync_skill(&self, req: &SyncRequest<'_>) -> Result<SyncOutcome> {
        self.check_canonical_path(req.canonical_dir)?;

        let canon_manifest = self.ensure_canonical_manifest(req)?;
        let baseline = canon_manifest.last_synced_hash.clone().ok_or_else(|| {
            SyncError::CanonicalInvalid {
                path: req.canonical_dir.to_path_buf(),
                reason: "manifest lacks a baseline hash after seeding".to_string(),
            }
        })?;

        let canonical_hash = hash_dir(self.fs, req.canonical_dir, &Exclusions::standard())?;
        let states = self.resolve_locations(req)?;
        let missing: Vec<String> = states
            .iter()
            .filter(|st| st.replica.is_none())
            .map(|st| st.location.id.clone())
            .collect();

        let mut changed: Vec<SourceRef> = Vec::new();
        if canonical_hash != baseline {
            changed.push(SourceRef::Canonical);
        }
        for st in &states {
            if let Some(hash) = &st.hash {
                if *hash != baseline {
                    changed.push(SourceRef::Location(st.location.id.clone()));
                }
            }
        }
        debug!(
            skill = req.skill_id,
            baseline = %baseline,
            changed = changed.len(),
            missing = missing.len(),
            "divergence computed"
        );

        let source = if let Some(forced) = &req.force_source {
            forced.clone()
        } else if changed.len() == 1 {
            changed[0].clone()
        } else if changed.is_empty() {
            if missing.is_empty() {
                return Ok(SyncOutcome::UpToDate);
            }
            for st in states.iter().filter(|st| st.replica.is_none()) {
                ops::export_skill(
                    self.fs,
                    req.canonical_dir,
                    req.preferred_name,
                    req.skill_id,
                    st.location,
                )?;
            }
            return Ok(SyncOutcome::ExportsCreated { locations: missing });
        } else {
            // Two or more writers and no override: snapshot every
            // reachable replica and stop without touching anything.
            let mut replicas = vec![ReplicaSnapshot {
                source: SourceRef::Canonical,
                path: req.canonical_dir.to_path_buf(),
                hash: canonical_hash.clone(),
                changed_from_baseline: canonical_hash != baseline,
            }];
            for st in &states {
                if let (Some(path), Some(hash)) = (&st.replica, &st.hash) {
                    replicas.push(ReplicaSnapshot {
                        source: SourceRef::Location(st.location.id.clone()),
                        path: path.clone(),
                        hash: hash.clone(),
                        changed_from_baseline: *hash != baseline,
                    });
                }
            }
            return Ok(SyncOutcome::Conflict { replicas });
        };

        self.propagate(req, &source, &states, canonical_hash)
    }

    /// Read-only divergence report; never seeds or mutates.
    pub fn inspect_skill(&self, req: &SyncRequest<'_>) -> Result<SkillStatus> {
        self.check_canonical_path(req.canonical_dir)?;

        let baseline = load_manifest(self.fs, req.canonical_dir)?
            .filter(|m| m.owns(req.skill_id))
            .and_then(|m| m.last_synced_hash);
        let canonical_hash = hash_dir(self.fs, req.canonical_dir, &Exclusions::standard())?;
        let states = self.resolve_locations(req)?;

        let changed = |hash: &str| baseline.as_deref().is_some_and(|b| b != hash);
        let mut replicas = vec![ReplicaSnapshot {
            source: SourceRef::Canonical,
            path: req.canonical_dir.to_path_buf(),
            changed_from_baseline: changed(&canonical_hash),
            hash: canonical_hash,
        }];
        let mut missing = Vec::new();
        for st in &states {
            match (&st.replica, &st.hash) {
                (Some(path), Some(hash)) => replicas.push(ReplicaSnapshot {
                    source: SourceRef::Location(st.location.id.clone()),
                    path: path.clone(),
                    changed_from_baseline: changed(hash),
                    hash: hash.clone(),
                }),
                _ => missing.push(st.location.id.clone()),
            }
        }
        Ok(SkillStatus {
            baseline,
            replicas,
            missing,
        })
    }

    /// Export canonical content into one location (§ lifecycle).
    pub fn export(
        &self,
        canonical_dir: &Path,
        preferred_name: &str,
        skill_id: &str,
        location: &Location,
    ) -> Result<PathBuf> {
        ops::export_skill(self.fs, canonical_dir, preferred_name, skill_id, location)
    }

    /// Move a skill's active replica into a location's disabled root.
    pub fn disable(
        &self,
        skill_id: &str,
        preferred_name: &str,
        location: &Location,
    ) -> Result<PathBuf> {
        ops::disable_skill(self.fs, skill_id, preferred_name, location)
    }

    /// Delete every managed replica of a skill at a location.
    pub fn remove(&self, skill_id: &str, location: &Location) -> Result<Vec<PathBuf>> {
        ops::remove_skill(self.fs, skill_id, location)
    }

    fn check_canonical_path(&self, canonical_dir: &Path) -> Result<()> {
        match self.fs.kind(canonical_dir)? {
            Some(EntryKind::Dir) => Ok(()),
            Some(EntryKind::File) => Err(SyncError::ArchiveNotMaterialized {
                path: canonical_dir.to_path_buf(),
            }),
            Some(EntryKind::Symlink) => Err(SyncError::SymlinkEncountered {
                path: canonical_dir.to_path_buf(),
            }),
            _ => Err(SyncError::CanonicalInvalid {
                path: canonical_dir.to_path_buf(),
                reason: "canonical path does not exist".to_string(),
            }),
        }
    }

    /// Create or repair the canonical manifest, seeding the baseline
    /// from current content on first-ever sync.
    fn ensure_canonical_manifest(&self, req: &SyncRequest<'_>) -> Result<SyncManifest> {
        match load_manifest(self.fs, req.canonical_dir)? {
            Some(manifest) if !manifest.owns(req.skill_id) => Err(SyncError::CanonicalInvalid {
                path: req.canonical_dir.to_path_buf(),
                reason: format!("manifest names a different skill ({})", manifest.skill_id),
            }),
            Some(manifest) if manifest.last_synced_hash.is_some() => Ok(manifest),
            Some(mut manifest) => {
                let hash = hash_dir(self.fs, req.canonical_dir, &Exclusions::standard())?;
                manifest.canonical = true;
                manifest.tool = CANONICAL_TOOL.to_string();
                manifest.last_synced_hash = Some(hash);
                manifest.last_sync_at = Utc::now();
                save_manifest(self.fs, &manifest, req.canonical_dir)?;
                Ok(manifest)
            }
            None => {
                let hash = hash_dir(self.fs, req.canonical_dir, &Exclusions::standard())?;
                let manifest = SyncManifest::canonical(req.skill_id, Some(hash));
                save_manifest(self.fs, &manifest, req.canonical_dir)?;
                info!(skill = req.skill_id, "seeded canonical manifest");
                Ok(manifest)
            }
        }
    }

    fn resolve_locations<'a>(&self, req: &SyncRequest<'a>) -> Result<Vec<LocationState<'a>>> {
        let mut states = Vec::with_capacity(req.enabled.len());
        for id in req.enabled {
            let location = req
                .locations
                .iter()
                .find(|loc| &loc.id == id)
                .ok_or_else(|| SyncError::UnknownLocation(id.clone()))?;
            let replica = find_replica(self.fs, req.skill_id, &location.active_root)?;
            let hash = match &replica {
                Some(path) => Some(hash_dir(self.fs, path, &Exclusions::standard())?),
                None => None,
            };
            states.push(LocationState {
                location,
                replica,
                hash,
            });
        }
        Ok(states)
    }

    /// Make `source` the winner: rewrite canonical if needed, stamp the
    /// canonical manifest, then refresh or re-export every enabled
    /// location.
    fn propagate(
        &self,
        req: &SyncRequest<'_>,
        source: &SourceRef,
        states: &[LocationState<'_>],
        canonical_hash: String,
    ) -> Result<SyncOutcome> {
        let winner_hash = match source {
            SourceRef::Canonical => canonical_hash,
            SourceRef::Location(id) => {
                let st = states
                    .iter()
                    .find(|st| &st.location.id == id)
                    .ok_or_else(|| SyncError::UnknownLocation(id.clone()))?;
                let src_path =
                    st.replica
                        .as_ref()
                        .ok_or_else(|| SyncError::MissingManagedExport {
                            skill_id: req.skill_id.to_string(),
                            location: id.clone(),
                        })?;
                replace_dir_contents(self.fs, req.canonical_dir, src_path)?;
                hash_dir(self.fs, req.canonical_dir, &Exclusions::standard())?
            }
        };

        let mut canon = load_manifest(self.fs, req.canonical_dir)?
            .unwrap_or_else(|| SyncManifest::canonical(req.skill_id, None));
        canon.canonical = true;
        canon.tool = CANONICAL_TOOL.to_string();
        canon.last_synced_hash = Some(winner_hash.clone());
        canon.last_sync_at = Utc::now();
        save_manifest(self.fs, &canon, req.canonical_dir)?;

        for st in states {
            let is_source = matches!(source, SourceRef::Location(id) if id == &st.location.id);
            if is_source {
                // Content already correct at the source; only its
                // manifest needs the new hash and timestamp.
                let replica =
                    st.replica
                        .as_ref()
                        .ok_or_else(|| SyncError::MissingManagedExport {
                            skill_id: req.skill_id.to_string(),
                            location: st.location.id.clone(),
                        })?;
                let mut manifest = load_manifest(self.fs, replica)?.unwrap_or_else(|| {
                    SyncManifest::exported(req.skill_id, &st.location.id, winner_hash.clone())
                });
                manifest.canonical = false;
                manifest.tool = st.location.id.clone();
                manifest.last_synced_hash = Some(winner_hash.clone());
                manifest.last_sync_at = Utc::now();
                save_manifest(self.fs, &manifest, replica)?;
            } else {
                ops::export_skill(
                    self.fs,
                    req.canonical_dir,
                    req.preferred_name,
                    req.skill_id,
                    st.location,
                )?;
            }
        }

        info!(skill = req.skill_id, source = %source, "propagated winner");
        Ok(SyncOutcome::Propagated {
            source: source.clone(),
        })
    }
}
