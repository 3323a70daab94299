//! Replica location resolution.
//!
//! A manifest claims a directory for a skill; the directory's name
//! proves nothing. The resolver walks the immediate skill-shaped
//! subdirectories of a root and returns the ones whose manifest carries
//! our ownership marker and the expected skill id, so replicas survive
//! arbitrary renames.

use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::sync::fs::{EntryKind, SyncFs};
use crate::sync::manifest::load_manifest;
use crate::sync::types::SKILL_MARKER;

/// All directories under `root` owned by `skill_id`. Symlinked entries
/// are pruned; only immediate subdirectories carrying the skill content
/// marker are considered.
pub fn find_replicas(fs: &dyn SyncFs, skill_id: &str, root: &Path) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(root)? {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for (name, kind) in fs.read_dir(root)? {
        if kind != EntryKind::Dir {
            continue;
        }
        let candidate = root.join(&name);
        if fs.kind(&candidate.join(SKILL_MARKER))? != Some(EntryKind::File) {
            continue;
        }
        if is_managed(fs, &candidate, skill_id)? {
            matches.push(candidate);
        }
    }
    Ok(matches)
}

/// First owned directory under `root`, if any.
pub fn find_replica(fs: &dyn SyncFs, skill_id: &str, root: &Path) -> Result<Option<PathBuf>> {
    Ok(find_replicas(fs, skill_id, root)?.into_iter().next())
}

/// The single gate that authorizes destructive operations: true iff a
/// manifest exists at `path`, carries the ownership marker, and names
/// the expected skill id. An unreadable manifest proves nothing and
/// counts as unmanaged.
pub fn is_managed(fs: &dyn SyncFs, path: &Path, skill_id: &str) -> Result<bool> {
    if !fs.is_dir(path)? {
        return Ok(false);
    }
    match load_manifest(fs, path) {
        Ok(Some(manifest)) => Ok(manifest.owns(skill_id)),
        Ok(None) => Ok(false),
        Err(SyncError::Serialization(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fs::RealFs;
    use crate::sync::manifest::{save_manifest, SyncManifest};

    fn managed_skill_dir(root: &Path, name: &str, skill_id: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(SKILL_MARKER), b"# body\n").expect("write");
        let manifest = SyncManifest::exported(skill_id, "claude", "sha256:00".to_string());
        save_manifest(&RealFs, &manifest, &dir).expect("save");
        dir
    }

    #[test]
    fn finds_replica_independent_of_name() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = managed_skill_dir(root.path(), "renamed-arbitrarily", "skill-1");

        let found = find_replica(&RealFs, "skill-1", root.path()).expect("resolve");
        assert_eq!(found, Some(dir));
    }

    #[test]
    fn skips_unmarked_and_foreign_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        // Not skill-shaped: no marker file.
        std::fs::create_dir(root.path().join("plain")).expect("mkdir");
        // Skill-shaped but owned by a different skill.
        managed_skill_dir(root.path(), "other", "skill-2");
        // Skill-shaped but no manifest at all.
        let unmanaged = root.path().join("unmanaged");
        std::fs::create_dir(&unmanaged).expect("mkdir");
        std::fs::write(unmanaged.join(SKILL_MARKER), b"x").expect("write");

        assert!(find_replica(&RealFs, "skill-1", root.path())
            .expect("resolve")
            .is_none());
    }

    #[test]
    fn corrupt_manifest_counts_as_unmanaged() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("broken");
        std::fs::create_dir_all(dir.join(crate::sync::types::SIDECAR_DIR)).expect("mkdir");
        std::fs::write(dir.join(SKILL_MARKER), b"x").expect("write");
        std::fs::write(
            dir.join(crate::sync::types::SIDECAR_DIR).join("manifest.json"),
            b"not json",
        )
        .expect("write");

        assert!(!is_managed(&RealFs, &dir, "skill-1").expect("gate"));
    }

    #[test]
    fn missing_root_resolves_to_nothing() {
        let root = tempfile::tempdir().expect("tempdir");
        let missing = root.path().join("absent");
        assert!(find_replicas(&RealFs, "skill-1", &missing)
            .expect("resolve")
            .is_empty());
    }
}
