//! Replica tree traversal.
//!
//! [`Walk`] is a lazy, finite iterator over the entries of a replica
//! subtree. Each entry is classified (file, directory, symlink, other)
//! and either yielded, recursed into, or pruned by the exclusion set.
//! Hashing and copying share the same walk, so a copy driven by the
//! same listing can never see paths the digest did not.

use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sync::fs::{EntryKind, SyncFs};
use crate::sync::types::SIDECAR_DIR;

/// OS artifact names pruned at any depth, alongside the sidecar.
const OS_ARTIFACTS: [&str; 4] = [".DS_Store", "Thumbs.db", "desktop.ini", "__MACOSX"];

/// Names excluded from hashing and copying, at any nesting depth.
#[derive(Debug, Clone)]
pub struct Exclusions {
    names: Vec<OsString>,
}

impl Exclusions {
    /// The standard set: the manifest sidecar plus OS artifacts.
    #[must_use]
    pub fn standard() -> Self {
        let mut names: Vec<OsString> = vec![SIDECAR_DIR.into()];
        names.extend(OS_ARTIFACTS.iter().map(OsString::from));
        Self { names }
    }

    /// No exclusions at all.
    #[must_use]
    pub fn none() -> Self {
        Self { names: Vec::new() }
    }

    #[must_use]
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        self.names.iter().any(|n| n.as_os_str() == name)
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::standard()
    }
}

/// One classified entry under the walk root.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub rel: PathBuf,
    pub kind: EntryKind,
}

/// Breadth-first walk of a directory tree through a [`SyncFs`].
///
/// Directories are yielded before their children. Symlinks are yielded
/// but never followed; the consumer decides whether they are an error.
/// Excluded names are pruned without being yielded.
pub struct Walk<'f> {
    fs: &'f dyn SyncFs,
    exclude: Exclusions,
    pending_dirs: VecDeque<(PathBuf, PathBuf)>,
    buffer: VecDeque<WalkEntry>,
    failed: bool,
}

impl<'f> Walk<'f> {
    #[must_use]
    pub fn new(fs: &'f dyn SyncFs, root: &Path, exclude: Exclusions) -> Self {
        let mut pending_dirs = VecDeque::new();
        pending_dirs.push_back((root.to_path_buf(), PathBuf::new()));
        Self {
            fs,
            exclude,
            pending_dirs,
            buffer: VecDeque::new(),
            failed: false,
        }
    }

    fn fill_buffer(&mut self) -> Result<()> {
        while self.buffer.is_empty() {
            let Some((dir, rel)) = self.pending_dirs.pop_front() else {
                return Ok(());
            };
            for (name, kind) in self.fs.read_dir(&dir)? {
                if self.exclude.is_excluded(&name) {
                    continue;
                }
                let path = dir.join(&name);
                let entry_rel = rel.join(&name);
                if kind == EntryKind::Dir {
                    self.pending_dirs.push_back((path.clone(), entry_rel.clone()));
                }
                self.buffer.push_back(WalkEntry {
                    path,
                    rel: entry_rel,
                    kind,
                });
            }
        }
        Ok(())
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.buffer.is_empty() {
            if let Err(err) = self.fill_buffer() {
                self.failed = true;
                return Some(Err(err));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

/// Render a relative path with `/` separators regardless of platform,
/// so digests agree across operating systems.
#[must_use]
pub fn portable_rel_path(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}
