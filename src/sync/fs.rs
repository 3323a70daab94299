//! Injected filesystem access for the sync engine.
//!
//! Every stat/enumerate/copy/move/remove the engine performs goes
//! through [`SyncFs`], so tests can substitute an instrumented
//! implementation instead of reaching for the global filesystem.
//! [`RealFs`] is the production implementation over `std::fs`.
//!
//! Classification never follows symlinks; the fail-closed symlink
//! policy in hashing and copying depends on that.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// What a directory entry is, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    /// Sockets, fifos, devices. Skipped by hashing and copying.
    Other,
}

/// Filesystem surface required by the engine.
pub trait SyncFs {
    /// Classify `path` without following symlinks; `None` if absent.
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Immediate children of `path` as `(name, kind)`, sorted by name
    /// for deterministic traversal.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<(OsString, EntryKind)>>;

    /// Open a regular file for streamed reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Whole-file read, for small sidecar files.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.open(path)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.kind(path)?.is_some())
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(self.kind(path)? == Some(EntryKind::Dir))
    }
}

fn classify(file_type: fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

/// Production [`SyncFs`] over `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl SyncFs for RealFs {
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(classify(meta.file_type()))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<(OsString, EntryKind)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push((entry.file_name(), classify(entry.file_type()?)));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_distinguishes_kinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"x").expect("write");

        let fs = RealFs;
        assert_eq!(fs.kind(dir.path()).unwrap(), Some(EntryKind::Dir));
        assert_eq!(fs.kind(&file).unwrap(), Some(EntryKind::File));
        assert_eq!(fs.kind(&dir.path().join("missing")).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn classify_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"x").expect("write");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&file, &link).expect("symlink");

        assert_eq!(RealFs.kind(&link).unwrap(), Some(EntryKind::Symlink));
    }

    #[test]
    fn read_dir_is_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["c", "a", "b"] {
            std::fs::write(dir.path().join(name), b"x").expect("write");
        }
        let names: Vec<_> = RealFs
            .read_dir(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
