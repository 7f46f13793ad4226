mod common;
use common::{paths, TestEnv, DAY, MIN};
use predicates::prelude::*;

#[test]
fn list_json_orders_newest_first_and_hides_dot_dirs() {
    let t = TestEnv::new();
    t.write("A.md", "---\ntitle: Alpha\n---\n\n# Heading\nBody text", 2 * MIN);
    t.write("notes/B.md", "plain", 3 * DAY);
    t.write("C.png", "png", 40 * DAY);
    t.write("song.mp3", "id3", MIN);
    t.write(".obsidian/workspace.md", "hidden", MIN);

    let rows = t.list_json();
    assert_eq!(paths(&rows), vec!["A.md", "notes/B.md", "C.png"]);
    let a = &rows[0];
    assert_eq!(a["displayName"], "Alpha");
    assert_eq!(a["sectionLabel"], "Today");
    assert_eq!(a["previewLines"][0], "Heading");
    assert_eq!(a["pinned"], false);
    assert_eq!(rows[2]["previewLines"][0], "Image file • 3 B");
}

#[test]
fn list_text_prints_section_headers() {
    let t = TestEnv::new();
    t.write("today.md", "# Fresh", MIN);
    t.bin()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Today").and(predicate::str::contains("  today")))
        .stdout(predicate::str::contains("    Fresh"));
}

#[test]
fn list_follows_locale() {
    let t = TestEnv::new();
    t.write("a.md", "x", MIN);
    t.bin()
        .args(["list", "--locale", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aujourd'hui"));
}

#[test]
fn missing_vault_is_an_error() {
    let t = TestEnv::new();
    let mut cmd = assert_cmd::Command::cargo_bin("recents").unwrap();
    cmd.env("RECENTS_LOG", "off")
        .arg("--vault")
        .arg(t.vault.join("nope"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}
