//! Configuration: library root, location table, per-skill enablement.
//!
//! Loaded from an explicit `--config` path, the `SKSYNC_CONFIG`
//! environment variable, or `<config_dir>/sksync/config.toml`, in that
//! order. Missing files fall back to defaults covering the common
//! tool directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::sync::types::{Location, CANONICAL_TOOL};

/// Template written by `sksync init` when no config exists yet.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# sksync configuration.
#
# [library]
# root = "~/skills"            # canonical skill library (defaults to the user data dir)
#
# [[locations]]                # one block per native tool directory
# id = "claude"
# name = "Claude Code"
# root = "~/.claude/skills"
# disabled_root = "~/.claude/skills.disabled"
# enabled = true               # default enablement for all skills
#
# [skills.my-skill]            # per-skill override of enabled locations
# locations = ["claude", "codex"]
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default = "default_locations")]
    pub locations: Vec<LocationConfig>,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            locations: default_locations(),
            skills: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Canonical skill library root. Defaults to `<data_dir>/sksync/skills`.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Active root the tool reads skills from.
    pub root: PathBuf,
    /// Disabled replicas move here. Defaults to `<root>.disabled`.
    #[serde(default)]
    pub disabled_root: Option<PathBuf>,
    /// Whether skills are exported here unless overridden per skill.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillOverride {
    /// Location ids this skill is enabled for, replacing the defaults.
    #[serde(default)]
    pub locations: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_locations() -> Vec<LocationConfig> {
    ["claude", "codex", "gemini"]
        .into_iter()
        .map(|id| LocationConfig {
            id: id.to_string(),
            name: None,
            root: PathBuf::from(format!("~/.{id}/skills")),
            disabled_root: None,
            enabled: id == "claude",
        })
        .collect()
}

impl Config {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SKSYNC_CONFIG").ok().map(PathBuf::from));

        let path = match explicit {
            Some(path) => path,
            None => match dirs::config_dir() {
                Some(dir) => dir.join("sksync/config.toml"),
                None => return Self::default().validated(),
            },
        };

        if !path.exists() {
            return Self::default().validated();
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|err| SyncError::Config(format!("read {}: {err}", path.display())))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|err| SyncError::Config(format!("parse {}: {err}", path.display())))?;
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for loc in &self.locations {
            if loc.id.is_empty() {
                return Err(SyncError::Config(
                    "location id must not be empty".to_string(),
                ));
            }
            if loc.id == CANONICAL_TOOL {
                return Err(SyncError::Config(format!(
                    "location id {CANONICAL_TOOL:?} is reserved for the canonical replica"
                )));
            }
            if !seen.insert(loc.id.clone()) {
                return Err(SyncError::Config(format!(
                    "duplicate location id: {}",
                    loc.id
                )));
            }
        }
        Ok(self)
    }

    /// Canonical library root, `~` expanded.
    #[must_use]
    pub fn library_root(&self) -> PathBuf {
        self.library.root.as_ref().map_or_else(
            || {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("sksync/skills")
            },
            |root| expand_tilde(root),
        )
    }

    /// Resolved location table, `~` expanded and disabled roots filled.
    #[must_use]
    pub fn resolved_locations(&self) -> Vec<Location> {
        self.locations
            .iter()
            .map(|loc| {
                let active_root = expand_tilde(&loc.root);
                let disabled_root = loc.disabled_root.as_ref().map_or_else(
                    || default_disabled_root(&active_root),
                    |root| expand_tilde(root),
                );
                Location {
                    id: loc.id.clone(),
                    name: loc.name.clone().unwrap_or_else(|| loc.id.clone()),
                    active_root,
                    disabled_root,
                }
            })
            .collect()
    }

    /// Location ids a skill syncs to: its override if present, else
    /// every location enabled by default.
    #[must_use]
    pub fn enabled_location_ids(&self, skill_name: &str) -> Vec<String> {
        if let Some(over) = self.skills.get(skill_name) {
            return over.locations.clone();
        }
        self.locations
            .iter()
            .filter(|loc| loc.enabled)
            .map(|loc| loc.id.clone())
            .collect()
    }
}

/// Sibling directory for disabled replicas: `<root>.disabled`.
fn default_disabled_root(active_root: &Path) -> PathBuf {
    let mut name = active_root
        .file_name()
        .map_or_else(|| "skills".to_string(), |n| n.to_string_lossy().into_owned());
    name.push_str(".disabled");
    active_root
        .parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// Expand a leading `~/` against the home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_claude_only() {
        let config = Config::default().validated().expect("valid");
        assert_eq!(config.enabled_location_ids("anything"), vec!["claude"]);
        assert_eq!(config.resolved_locations().len(), 3);
    }

    #[test]
    fn per_skill_override_replaces_defaults() {
        let raw = r#"
            [skills.special]
            locations = ["codex", "gemini"]
        "#;
        let config: Config = toml::from_str(raw).expect("parse");
        assert_eq!(
            config.enabled_location_ids("special"),
            vec!["codex", "gemini"]
        );
        assert_eq!(config.enabled_location_ids("other"), vec!["claude"]);
    }

    #[test]
    fn canonical_location_id_is_rejected() {
        let raw = r#"
            [[locations]]
            id = "canonical"
            root = "/tmp/x"
        "#;
        let config: Config = toml::from_str(raw).expect("parse");
        assert!(config.validated().is_err());
    }

    #[test]
    fn disabled_root_defaults_to_sibling() {
        let raw = r#"
            [[locations]]
            id = "claude"
            root = "/home/u/.claude/skills"
        "#;
        let config: Config = toml::from_str::<Config>(raw)
            .expect("parse")
            .validated()
            .expect("valid");
        let locations = config.resolved_locations();
        assert_eq!(
            locations[0].disabled_root,
            PathBuf::from("/home/u/.claude/skills.disabled")
        );
    }

    #[test]
    fn duplicate_location_ids_are_rejected() {
        let raw = r#"
            [[locations]]
            id = "claude"
            root = "/a"

            [[locations]]
            id = "claude"
            root = "/b"
        "#;
        let config: Config = toml::from_str(raw).expect("parse");
        assert!(config.validated().is_err());
    }
}
