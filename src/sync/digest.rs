//! Content-addressed change detection.
//!
//! A replica's digest is one SHA-256 over every regular file in the
//! tree, visited in ascending relative-path order so the result is
//! independent of filesystem enumeration order. Per file the hash
//! covers the portable relative path, a separator, the streamed file
//! content, and a closing separator; any content change, addition,
//! removal, or rename therefore changes the digest.
//!
//! Symlinks fail the digest outright. A later copy driven by the same
//! tree listing can then never be tricked into escaping the source.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Result, SyncError};
use crate::sync::fs::{EntryKind, SyncFs};
use crate::sync::walk::{portable_rel_path, Exclusions, Walk};

/// Streaming chunk size for file content.
const CHUNK_SIZE: usize = 64 * 1024;

/// Field separator inside the running hash.
const SEPARATOR: [u8; 1] = [0u8];

/// Hash a directory tree, skipping `exclude` names at any depth.
pub fn hash_dir(fs: &dyn SyncFs, root: &Path, exclude: &Exclusions) -> Result<String> {
    match fs.kind(root)? {
        Some(EntryKind::Dir) => {}
        Some(EntryKind::Symlink) => {
            return Err(SyncError::SymlinkEncountered {
                path: root.to_path_buf(),
            });
        }
        _ => {
            return Err(SyncError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
    }

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in Walk::new(fs, root, exclude.clone()) {
        let entry = entry?;
        match entry.kind {
            EntryKind::File => files.push((portable_rel_path(&entry.rel), entry.path)),
            EntryKind::Symlink => {
                return Err(SyncError::SymlinkEncountered { path: entry.path });
            }
            EntryKind::Dir | EntryKind::Other => {}
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (rel, path) in files {
        hasher.update(rel.as_bytes());
        hasher.update(SEPARATOR);
        stream_into(fs, &path, &mut hasher)?;
        hasher.update(SEPARATOR);
    }
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Hash a single regular, non-symlink file with the same chunked scheme.
pub fn hash_file(fs: &dyn SyncFs, path: &Path) -> Result<String> {
    match fs.kind(path)? {
        Some(EntryKind::File) => {}
        Some(EntryKind::Symlink) => {
            return Err(SyncError::SymlinkEncountered {
                path: path.to_path_buf(),
            });
        }
        _ => {
            return Err(SyncError::ValidationFailed(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
    }

    let mut hasher = Sha256::new();
    stream_into(fs, path, &mut hasher)?;
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

fn stream_into(fs: &dyn SyncFs, path: &Path, hasher: &mut Sha256) -> Result<()> {
    let mut reader = fs.open(path)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fs::RealFs;
    use crate::sync::types::SIDECAR_DIR;

    fn scratch_skill() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("SKILL.md"), b"# demo\n").expect("write");
        std::fs::create_dir(dir.path().join("resources")).expect("mkdir");
        std::fs::write(dir.path().join("resources/data.txt"), b"payload").expect("write");
        dir
    }

    #[test]
    fn hash_dir_is_deterministic() {
        let dir = scratch_skill();
        let first = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        let second = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        assert_eq!(first, second);
        assert!(first.starts_with("sha256:"));
    }

    #[test]
    fn excluded_paths_do_not_affect_hash() {
        let dir = scratch_skill();
        let before = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");

        std::fs::create_dir(dir.path().join(SIDECAR_DIR)).expect("mkdir");
        std::fs::write(dir.path().join(SIDECAR_DIR).join("manifest.json"), b"{}").expect("write");
        std::fs::write(dir.path().join("resources/.DS_Store"), b"junk").expect("write");

        let after = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        assert_eq!(before, after);
    }

    #[test]
    fn content_change_changes_hash() {
        let dir = scratch_skill();
        let before = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        std::fs::write(dir.path().join("resources/data.txt"), b"payload2").expect("write");
        let after = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        assert_ne!(before, after);
    }

    #[test]
    fn rename_changes_hash() {
        let dir = scratch_skill();
        let before = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        std::fs::rename(
            dir.path().join("resources/data.txt"),
            dir.path().join("resources/renamed.txt"),
        )
        .expect("rename");
        let after = hash_dir(&RealFs, dir.path(), &Exclusions::standard()).expect("hash");
        assert_ne!(before, after);
    }

    #[test]
    fn non_directory_target_fails() {
        let dir = scratch_skill();
        let err = hash_dir(
            &RealFs,
            &dir.path().join("SKILL.md"),
            &Exclusions::standard(),
        )
        .expect_err("file target must fail");
        assert!(matches!(err, SyncError::NotADirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_fails_closed() {
        let dir = scratch_skill();
        std::os::unix::fs::symlink(dir.path().join("SKILL.md"), dir.path().join("link.md"))
            .expect("symlink");
        let err = hash_dir(&RealFs, dir.path(), &Exclusions::standard())
            .expect_err("symlink must fail");
        assert!(matches!(err, SyncError::SymlinkEncountered { .. }));
    }

    #[test]
    fn hash_file_matches_content_only() {
        let dir = scratch_skill();
        let a = hash_file(&RealFs, &dir.path().join("SKILL.md")).expect("hash");
        std::fs::write(dir.path().join("copy.md"), b"# demo\n").expect("write");
        let b = hash_file(&RealFs, &dir.path().join("copy.md")).expect("hash");
        assert_eq!(a, b);
    }
}
