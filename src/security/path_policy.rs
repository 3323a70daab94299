//! Replica name validation.
//!
//! Preferred names come from skill metadata and end up as directory
//! names under tool roots. A name must stay a single plain path
//! component: no traversal sequences, no separators, no reserved
//! sidecar name.

use crate::error::{Result, SyncError};
use crate::sync::types::SIDECAR_DIR;

/// Validate a preferred replica directory name.
pub fn validate_replica_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "empty name"));
    }
    if name == "." || name == ".." {
        return Err(invalid(name, "traversal sequence"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid(name, "contains a path separator"));
    }
    if name.contains('\0') {
        return Err(invalid(name, "contains a null byte"));
    }
    if name == SIDECAR_DIR {
        return Err(invalid(name, "reserved sidecar name"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> SyncError {
    SyncError::ValidationFailed(format!("invalid replica name {name:?}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_component_names() {
        for name in ["demo", "my-skill", "skill_2", "Étude"] {
            assert!(validate_replica_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_traversal_separators_and_reserved_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "a\0b", SIDECAR_DIR] {
            assert!(validate_replica_name(name).is_err(), "{name:?}");
        }
    }
}
