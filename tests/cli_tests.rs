//! CLI integration tests over a scratch library.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_config(root: &Path) -> std::path::PathBuf {
    let config_path = root.join("config.toml");
    let body = format!(
        r#"
[library]
root = "{lib}"

[[locations]]
id = "codex"
name = "Codex"
root = "{codex}"
"#,
        lib = root.join("library").display(),
        codex = root.join("codex/skills").display(),
    );
    std::fs::write(&config_path, body).expect("write config");
    config_path
}

fn seed_skill(root: &Path, name: &str, body: &str) {
    let dir = root.join("library").join(name);
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("SKILL.md"), body).expect("write");
}

fn sksync(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sksync").expect("binary");
    cmd.arg("--config").arg(config).env_remove("SKSYNC_ROOT");
    cmd
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("sksync")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("sync")
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("disable")),
        );
}

#[test]
fn sync_exports_then_reports_up_to_date() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());
    seed_skill(tmp.path(), "demo", "v1");

    sksync(&config)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to").and(predicate::str::contains("codex")));

    assert_eq!(
        std::fs::read_to_string(tmp.path().join("codex/skills/demo/SKILL.md")).expect("read"),
        "v1"
    );

    sksync(&config)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn conflicting_edits_exit_with_code_two() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());
    seed_skill(tmp.path(), "demo", "v1");

    sksync(&config).arg("sync").assert().success();

    std::fs::write(tmp.path().join("library/demo/SKILL.md"), "v3").expect("write");
    std::fs::write(tmp.path().join("codex/skills/demo/SKILL.md"), "v4").expect("write");

    sksync(&config)
        .arg("sync")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("CONFLICT").and(predicate::str::contains("force-source")));

    // Forced resolution through the CLI.
    sksync(&config)
        .args(["sync", "demo", "--force-source", "codex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("propagated from codex"));
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("library/demo/SKILL.md")).expect("read"),
        "v4"
    );
}

#[test]
fn status_is_read_only() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());
    seed_skill(tmp.path(), "demo", "v1");

    sksync(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("never synced"));

    // No manifest was seeded, no replica was created.
    assert!(!tmp.path().join("library/demo/.sksync").exists());
    assert!(!tmp.path().join("codex/skills/demo").exists());
}

#[test]
fn robot_mode_emits_json() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());
    seed_skill(tmp.path(), "demo", "v1");

    let output = sksync(&config)
        .args(["--robot", "sync"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(parsed["failures"], 0);
    assert_eq!(parsed["skills"][0]["skill"], "demo");
}

#[test]
fn unknown_skill_fails_with_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());

    sksync(&config)
        .args(["export", "ghost", "codex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skill not found"));
}
