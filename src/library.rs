//! Library coordination: discovery, the serialized sweep, and the
//! advisory sweep lock.
//!
//! The engine itself processes one skill per call; this module is the
//! caller side. A sweep walks every skill in the library strictly one
//! after another, catches per-skill failures so one bad skill never
//! blocks the rest, and aggregates outcomes into an exit code.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::sync::engine::{SyncEngine, SyncRequest};
use crate::sync::fs::RealFs;
use crate::sync::manifest::load_manifest;
use crate::sync::types::{SourceRef, SyncOutcome, MANAGED_BY, SKILL_MARKER};

/// One discovered skill: stable id, display name, canonical directory.
#[derive(Debug, Clone)]
pub struct SkillRef {
    pub id: String,
    pub name: String,
    pub dir: PathBuf,
}

/// Result of syncing one skill during a sweep.
#[derive(Debug)]
pub struct SkillSyncResult {
    pub skill: SkillRef,
    pub result: Result<SyncOutcome>,
}

/// Aggregate of one full sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub results: Vec<SkillSyncResult>,
}

impl SweepReport {
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.result, Ok(outcome) if outcome.is_conflict()))
            .count()
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_err()).count()
    }

    /// Process exit code: 0 clean, 1 partial failure, 2 conflicts
    /// awaiting a human decision.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.conflicts() > 0 {
            2
        } else if self.failures() > 0 {
            1
        } else {
            0
        }
    }
}

/// Discover skills: immediate subdirectories of the library root that
/// carry the content marker. Symlinked entries are pruned. The id comes
/// from an existing canonical manifest when there is one; otherwise a
/// fresh UUID is minted and persisted by the first sync.
pub fn discover_skills(root: &Path) -> Result<Vec<SkillRef>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut skills = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            SyncError::Config(format!("scan {}: {err}", root.display()))
        })?;
        if entry.path_is_symlink() || !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path().to_path_buf();
        if !dir.join(SKILL_MARKER).is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let id = match load_manifest(&RealFs, &dir) {
            Ok(Some(manifest)) if manifest.managed_by == MANAGED_BY => manifest.skill_id,
            _ => Uuid::new_v4().to_string(),
        };
        skills.push(SkillRef { id, name, dir });
    }
    debug!(root = %root.display(), count = skills.len(), "discovered skills");
    Ok(skills)
}

/// Look up a single skill by directory name.
pub fn find_skill(root: &Path, name: &str) -> Result<SkillRef> {
    discover_skills(root)?
        .into_iter()
        .find(|skill| skill.name == name)
        .ok_or_else(|| SyncError::SkillNotFound(name.to_string()))
}

/// Advisory lock held for the duration of a sweep so concurrent sweeps
/// cannot interleave on the same library.
pub struct SweepLock {
    _file: File,
}

impl SweepLock {
    const LOCK_FILENAME: &'static str = ".sksync.lock";

    pub fn acquire(library_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(library_root)?;
        let path = library_root.join(Self::LOCK_FILENAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| SyncError::LockBusy { path: path.clone() })?;
        Ok(Self { _file: file })
    }
}

/// Run a serialized sweep over the library (or one named skill).
/// Engine failures are recorded per skill, never propagated.
pub fn sweep(
    engine: &SyncEngine<'_>,
    config: &Config,
    library_root: &Path,
    only_skill: Option<&str>,
    force_source: Option<SourceRef>,
) -> Result<SweepReport> {
    let _lock = SweepLock::acquire(library_root)?;
    let locations = config.resolved_locations();

    let skills = match only_skill {
        Some(name) => vec![find_skill(library_root, name)?],
        None => discover_skills(library_root)?,
    };

    let mut report = SweepReport::default();
    for skill in skills {
        let enabled = config.enabled_location_ids(&skill.name);
        let request = SyncRequest {
            skill_id: &skill.id,
            preferred_name: &skill.name,
            canonical_dir: &skill.dir,
            enabled: &enabled,
            locations: &locations,
            force_source: force_source.clone(),
        };
        let result = engine.sync_skill(&request);
        if let Err(err) = &result {
            warn!(skill = %skill.name, error = %err, "skill sync failed; continuing sweep");
        }
        report.results.push(SkillSyncResult { skill, result });
    }
    Ok(report)
}
