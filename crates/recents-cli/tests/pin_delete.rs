mod common;
use common::{paths, TestEnv, DAY, MIN};
use predicates::prelude::*;

#[test]
fn pin_and_unpin_reorder_the_list() {
    let t = TestEnv::new();
    t.write("new.md", "n", MIN);
    t.write("old.md", "o", 90 * DAY);

    t.bin().args(["pin", "old.md"]).assert().success().stdout("pinned old.md\n");
    assert!(t.settings_toml().contains("old.md"));
    let rows = t.list_json();
    assert_eq!(paths(&rows), vec!["old.md", "new.md"]);
    assert_eq!(rows[0]["pinned"], true);
    assert_eq!(rows[0]["sectionLabel"], "Pinned");

    // pinning twice keeps a single entry
    t.bin().args(["pin", "old.md"]).assert().success();
    assert_eq!(t.settings_toml().matches("old.md").count(), 1);

    t.bin().args(["unpin", "old.md"]).assert().success();
    assert_eq!(paths(&t.list_json()), vec!["new.md", "old.md"]);
}

#[test]
fn delete_moves_to_trash_and_skips_missing_files() {
    let t = TestEnv::new();
    t.write("notes/gone.md", "bye", MIN);
    t.bin()
        .args(["delete", "notes/gone.md"])
        .assert()
        .success()
        .stdout("deleted notes/gone.md\n");
    assert!(!t.vault.join("notes/gone.md").exists());
    assert!(t.vault.join(".trash/notes/gone.md").is_file());
    assert!(paths(&t.list_json()).is_empty());

    t.bin()
        .args(["delete", "notes/gone.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
}

#[test]
fn delete_refuses_paths_outside_the_vault() {
    let t = TestEnv::new();
    let outside = t.vault.parent().unwrap().join("outside.txt");
    std::fs::write(&outside, "keep").unwrap();
    t.bin()
        .args(["delete", "../outside.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
    t.bin()
        .arg("delete")
        .arg(&outside)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
    assert!(outside.is_file());
    assert!(!t.vault.join(".trash").exists());
}
