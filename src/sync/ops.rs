//! Replica lifecycle operations: export, disable, remove.
//!
//! Every destructive step re-checks manifest ownership immediately
//! before mutating. Disabling moves content into the location's
//! disabled root instead of deleting it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::security::validate_replica_name;
use crate::sync::digest::hash_dir;
use crate::sync::fs::{EntryKind, SyncFs};
use crate::sync::manifest::{save_manifest, SyncManifest};
use crate::sync::resolver::{find_replica, find_replicas, is_managed};
use crate::sync::types::{Location, SIDECAR_DIR};
use crate::sync::walk::{Exclusions, Walk};

/// Copy a tree, applying `exclude` at any depth. Refuses symlinks.
pub(crate) fn copy_tree(
    fs: &dyn SyncFs,
    src: &Path,
    dst: &Path,
    exclude: &Exclusions,
) -> Result<()> {
    fs.create_dir_all(dst)?;
    for entry in Walk::new(fs, src, exclude.clone()) {
        let entry = entry?;
        let target = dst.join(&entry.rel);
        match entry.kind {
            EntryKind::Dir => fs.create_dir_all(&target)?,
            EntryKind::File => {
                fs.copy_file(&entry.path, &target)?;
            }
            EntryKind::Symlink => {
                return Err(SyncError::SymlinkEncountered { path: entry.path });
            }
            EntryKind::Other => {}
        }
    }
    Ok(())
}

/// Replace everything under `target` except its sidecar with a copy of
/// `source`'s content. Used when a non-canonical winner overwrites the
/// canonical replica; the canonical manifest must survive.
pub(crate) fn replace_dir_contents(fs: &dyn SyncFs, target: &Path, source: &Path) -> Result<()> {
    for (name, kind) in fs.read_dir(target)? {
        if name.as_os_str() == std::ffi::OsStr::new(SIDECAR_DIR) {
            continue;
        }
        let path = target.join(&name);
        match kind {
            EntryKind::Dir => fs.remove_dir_all(&path)?,
            EntryKind::File | EntryKind::Symlink | EntryKind::Other => fs.remove_file(&path)?,
        }
    }
    copy_tree(fs, source, target, &Exclusions::standard())
}

/// Move a directory, falling back to copy-then-remove when rename
/// crosses filesystems. The fallback copies everything, sidecar
/// included.
fn move_dir(fs: &dyn SyncFs, from: &Path, to: &Path) -> Result<()> {
    if fs.rename(from, to).is_ok() {
        return Ok(());
    }
    copy_tree(fs, from, to, &Exclusions::none())?;
    fs.remove_dir_all(from)?;
    Ok(())
}

/// Delete a directory only after re-proving ownership.
fn remove_managed_dir(fs: &dyn SyncFs, path: &Path, skill_id: &str) -> Result<()> {
    if !is_managed(fs, path, skill_id)? {
        return Err(SyncError::UnmanagedDestination {
            path: path.to_path_buf(),
        });
    }
    fs.remove_dir_all(path)?;
    Ok(())
}

/// Remove manifest-verified disabled copies of a skill at a location.
/// Runs before every fresh export so re-enabling never leaves
/// duplicates behind.
fn remove_disabled_copies(fs: &dyn SyncFs, skill_id: &str, location: &Location) -> Result<()> {
    for stale in find_replicas(fs, skill_id, &location.disabled_root)? {
        debug!(path = %stale.display(), "removing stale disabled copy");
        remove_managed_dir(fs, &stale, skill_id)?;
    }
    Ok(())
}

/// Export canonical content into a location's active root.
///
/// The destination is resolved by existing manifest ownership first,
/// falling back to a path derived from `preferred_name`. An existing
/// destination that is not provably this skill's replica is never
/// overwritten.
pub fn export_skill(
    fs: &dyn SyncFs,
    canonical_dir: &Path,
    preferred_name: &str,
    skill_id: &str,
    location: &Location,
) -> Result<PathBuf> {
    match fs.kind(canonical_dir)? {
        Some(EntryKind::Dir) => {}
        Some(EntryKind::File) => {
            return Err(SyncError::ArchiveNotMaterialized {
                path: canonical_dir.to_path_buf(),
            });
        }
        Some(EntryKind::Symlink) => {
            return Err(SyncError::SymlinkEncountered {
                path: canonical_dir.to_path_buf(),
            });
        }
        _ => {
            return Err(SyncError::CanonicalInvalid {
                path: canonical_dir.to_path_buf(),
                reason: "canonical path does not exist".to_string(),
            });
        }
    }
    validate_replica_name(preferred_name)?;

    fs.create_dir_all(&location.active_root)?;
    remove_disabled_copies(fs, skill_id, location)?;

    let dest = match find_replica(fs, skill_id, &location.active_root)? {
        Some(existing) => existing,
        None => location.active_root.join(preferred_name),
    };
    if fs.exists(&dest)? {
        if !is_managed(fs, &dest, skill_id)? {
            return Err(SyncError::UnmanagedDestination { path: dest });
        }
        fs.remove_dir_all(&dest)?;
    }

    copy_tree(fs, canonical_dir, &dest, &Exclusions::standard())?;
    let hash = hash_dir(fs, &dest, &Exclusions::standard())?;
    save_manifest(fs, &SyncManifest::exported(skill_id, &location.id, hash), &dest)?;

    info!(skill = skill_id, location = %location.id, path = %dest.display(), "exported replica");
    Ok(dest)
}

/// Move a skill's active replica into the location's disabled root.
/// The name gains a timestamp suffix only on collision.
pub fn disable_skill(
    fs: &dyn SyncFs,
    skill_id: &str,
    preferred_name: &str,
    location: &Location,
) -> Result<PathBuf> {
    let active = find_replica(fs, skill_id, &location.active_root)?.ok_or_else(|| {
        SyncError::MissingManagedExport {
            skill_id: skill_id.to_string(),
            location: location.id.clone(),
        }
    })?;
    if !is_managed(fs, &active, skill_id)? {
        return Err(SyncError::UnmanagedDestination { path: active });
    }

    fs.create_dir_all(&location.disabled_root)?;
    remove_disabled_copies(fs, skill_id, location)?;

    let name = active
        .file_name()
        .map_or_else(|| preferred_name.to_string(), |n| n.to_string_lossy().into_owned());
    let mut dest = location.disabled_root.join(&name);
    if fs.exists(&dest)? {
        dest = location
            .disabled_root
            .join(format!("{name}-{}", Utc::now().format("%Y%m%d%H%M%S")));
    }

    move_dir(fs, &active, &dest)?;
    info!(skill = skill_id, location = %location.id, path = %dest.display(), "disabled replica");
    Ok(dest)
}

/// Delete every manifest-verified replica of a skill at a location,
/// active and disabled. Used on skill deletion or when a location is
/// un-enabled.
pub fn remove_skill(fs: &dyn SyncFs, skill_id: &str, location: &Location) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for root in [&location.active_root, &location.disabled_root] {
        for replica in find_replicas(fs, skill_id, root)? {
            remove_managed_dir(fs, &replica, skill_id)?;
            removed.push(replica);
        }
    }
    if !removed.is_empty() {
        info!(skill = skill_id, location = %location.id, count = removed.len(), "removed replicas");
    }
    Ok(removed)
}
