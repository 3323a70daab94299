//! Shared test utilities for sksync.
//!
//! A [`ScratchSite`] is a throwaway on-disk world: a library root plus
//! any number of locations, all inside one temp directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::sync::types::{Location, SKILL_MARKER};

pub struct ScratchSite {
    pub temp: TempDir,
    pub library_root: PathBuf,
    pub locations: Vec<Location>,
}

impl ScratchSite {
    /// Build a site with one location per id.
    #[must_use]
    pub fn new(location_ids: &[&str]) -> Self {
        let temp = TempDir::new().expect("create scratch site");
        let library_root = temp.path().join("library");
        std::fs::create_dir_all(&library_root).expect("create library root");

        let locations = location_ids
            .iter()
            .map(|id| Location {
                id: (*id).to_string(),
                name: (*id).to_string(),
                active_root: temp.path().join(format!("{id}/skills")),
                disabled_root: temp.path().join(format!("{id}/skills.disabled")),
            })
            .collect();

        Self {
            temp,
            library_root,
            locations,
        }
    }

    /// Create a canonical skill directory with the given marker body.
    pub fn add_skill(&self, name: &str, body: &str) -> PathBuf {
        let dir = self.library_root.join(name);
        std::fs::create_dir_all(&dir).expect("create skill dir");
        std::fs::write(dir.join(SKILL_MARKER), body).expect("write skill marker");
        dir
    }

    #[must_use]
    pub fn location(&self, id: &str) -> &Location {
        self.locations
            .iter()
            .find(|loc| loc.id == id)
            .expect("location configured in scratch site")
    }

    /// All location ids, as an enabled set.
    #[must_use]
    pub fn enabled(&self) -> Vec<String> {
        self.locations.iter().map(|loc| loc.id.clone()).collect()
    }
}

/// Overwrite the marker body of a replica located at `dir`.
pub fn write_body(dir: &Path, body: &str) {
    std::fs::write(dir.join(SKILL_MARKER), body).expect("write skill marker");
}

/// Read the marker body of a replica located at `dir`.
#[must_use]
pub fn read_body(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(SKILL_MARKER)).expect("read skill marker")
}
