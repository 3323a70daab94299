//! Export / disable / remove lifecycle, including ownership safety.

use sksync::sync::digest::hash_dir;
use sksync::sync::fs::RealFs;
use sksync::sync::manifest::{save_manifest, SyncManifest};
use sksync::sync::ops::{disable_skill, export_skill, remove_skill};
use sksync::sync::resolver::{find_replica, find_replicas};
use sksync::sync::types::SKILL_MARKER;
use sksync::sync::walk::Exclusions;
use sksync::test_utils::{read_body, ScratchSite};
use sksync::SyncError;

#[test]
fn disable_preserves_content_digest_and_reexport_cleans_up() {
    let site = ScratchSite::new(&["claude"]);
    let canonical = site.add_skill("demo", "v1");
    let location = site.location("claude");

    let active = export_skill(&RealFs, &canonical, "demo", "skill-demo", location)
        .expect("export");
    let before = hash_dir(&RealFs, &active, &Exclusions::standard()).expect("hash");

    let parked = disable_skill(&RealFs, "skill-demo", "demo", location).expect("disable");
    assert!(parked.starts_with(&location.disabled_root));
    assert!(!active.exists());
    let after = hash_dir(&RealFs, &parked, &Exclusions::standard()).expect("hash");
    assert_eq!(before, after);

    // Re-enabling removes the disabled copy before writing the fresh
    // export, so no duplicates survive.
    let reexported =
        export_skill(&RealFs, &canonical, "demo", "skill-demo", location).expect("re-export");
    assert_eq!(read_body(&reexported), "v1");
    assert!(find_replicas(&RealFs, "skill-demo", &location.disabled_root)
        .expect("resolve")
        .is_empty());
}

#[test]
fn disable_appends_timestamp_suffix_only_on_collision() {
    let site = ScratchSite::new(&["claude"]);
    let canonical = site.add_skill("demo", "v1");
    let location = site.location("claude");

    export_skill(&RealFs, &canonical, "demo", "skill-demo", location).expect("export");

    // An unmanaged squatter occupies the plain name in the disabled
    // root; it must survive untouched.
    let squatter = location.disabled_root.join("demo");
    std::fs::create_dir_all(&squatter).expect("mkdir");
    std::fs::write(squatter.join("keep.txt"), b"mine").expect("write");

    let parked = disable_skill(&RealFs, "skill-demo", "demo", location).expect("disable");
    let parked_name = parked.file_name().expect("name").to_string_lossy().into_owned();
    assert_ne!(parked_name, "demo");
    assert!(parked_name.starts_with("demo-"));
    assert!(squatter.join("keep.txt").exists());
}

#[test]
fn disable_without_replica_is_a_typed_error() {
    let site = ScratchSite::new(&["claude"]);
    site.add_skill("demo", "v1");
    let location = site.location("claude");

    let err = disable_skill(&RealFs, "skill-demo", "demo", location).expect_err("no replica");
    assert!(matches!(err, SyncError::MissingManagedExport { .. }));
}

#[test]
fn export_refuses_manifest_of_a_different_skill() {
    let site = ScratchSite::new(&["claude"]);
    let canonical = site.add_skill("demo", "v1");
    let location = site.location("claude");

    // A directory at the preferred name, skill-shaped and managed, but
    // owned by another skill id.
    let foreign = location.active_root.join("demo");
    std::fs::create_dir_all(&foreign).expect("mkdir");
    std::fs::write(foreign.join(SKILL_MARKER), b"other").expect("write");
    let manifest = SyncManifest::exported("some-other-skill", "claude", "sha256:00".to_string());
    save_manifest(&RealFs, &manifest, &foreign).expect("save");

    let err = export_skill(&RealFs, &canonical, "demo", "skill-demo", location)
        .expect_err("foreign manifest");
    assert!(matches!(err, SyncError::UnmanagedDestination { .. }));
    assert_eq!(std::fs::read(foreign.join(SKILL_MARKER)).expect("read"), b"other");
}

#[test]
fn export_reuses_a_renamed_replica_instead_of_duplicating() {
    let site = ScratchSite::new(&["claude"]);
    let canonical = site.add_skill("demo", "v1");
    let location = site.location("claude");

    export_skill(&RealFs, &canonical, "demo", "skill-demo", location).expect("export");
    std::fs::rename(
        location.active_root.join("demo"),
        location.active_root.join("my-demo"),
    )
    .expect("rename");

    export_skill(&RealFs, &canonical, "demo", "skill-demo", location).expect("re-export");
    let replicas = find_replicas(&RealFs, "skill-demo", &location.active_root).expect("resolve");
    assert_eq!(replicas, vec![location.active_root.join("my-demo")]);
    assert!(!location.active_root.join("demo").exists());
}

#[test]
fn remove_deletes_active_and_disabled_replicas_only() {
    let site = ScratchSite::new(&["claude"]);
    let canonical = site.add_skill("demo", "v1");
    let location = site.location("claude");

    let active = export_skill(&RealFs, &canonical, "demo", "skill-demo", location)
        .expect("export");

    // Hand-build a disabled copy with a valid manifest.
    let disabled = location.disabled_root.join("demo-20250101000000");
    std::fs::create_dir_all(&disabled).expect("mkdir");
    std::fs::write(disabled.join(SKILL_MARKER), b"old").expect("write");
    let manifest = SyncManifest::exported("skill-demo", "claude", "sha256:01".to_string());
    save_manifest(&RealFs, &manifest, &disabled).expect("save");

    // An unmanaged neighbor must survive.
    let neighbor = location.active_root.join("not-ours");
    std::fs::create_dir_all(&neighbor).expect("mkdir");
    std::fs::write(neighbor.join(SKILL_MARKER), b"keep").expect("write");

    let removed = remove_skill(&RealFs, "skill-demo", location).expect("remove");
    assert_eq!(removed.len(), 2);
    assert!(!active.exists());
    assert!(!disabled.exists());
    assert!(neighbor.exists());
}

#[test]
fn remove_with_nothing_present_is_a_no_op() {
    let site = ScratchSite::new(&["claude"]);
    site.add_skill("demo", "v1");
    let location = site.location("claude");

    let removed = remove_skill(&RealFs, "skill-demo", location).expect("remove");
    assert!(removed.is_empty());
}

#[test]
fn resolver_finds_replica_after_rename() {
    let site = ScratchSite::new(&["claude"]);
    let canonical = site.add_skill("demo", "v1");
    let location = site.location("claude");

    export_skill(&RealFs, &canonical, "demo", "skill-demo", location).expect("export");
    std::fs::rename(
        location.active_root.join("demo"),
        location.active_root.join("totally-different"),
    )
    .expect("rename");

    assert_eq!(
        find_replica(&RealFs, "skill-demo", &location.active_root).expect("resolve"),
        Some(location.active_root.join("totally-different"))
    );
}
