#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub vault: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let vault = dir.path().join("vault");
        std::fs::create_dir_all(&vault).expect("vault dir");
        Self { _dir: dir, vault }
    }

    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("recents").unwrap();
        cmd.env("RECENTS_LOG", "off");
        cmd.env("LANG", "en_US.UTF-8");
        cmd.arg("--vault").arg(&self.vault);
        cmd
    }

    /// Writes `rel` with its modification time `age` in the past.
    pub fn write(&self, rel: &str, content: &str, age: Duration) -> PathBuf {
        let path = self.vault.join(rel);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        let f = std::fs::File::options().write(true).open(&path).unwrap();
        f.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    pub fn settings_toml(&self) -> String {
        std::fs::read_to_string(self.vault.join(".recents/settings.toml")).unwrap_or_default()
    }

    pub fn list_json(&self) -> serde_json::Value {
        let out = self
            .bin()
            .args(["list", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

pub fn paths(rows: &serde_json::Value) -> Vec<String> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["file"]["path"].as_str().unwrap().to_string())
        .collect()
}

pub const MIN: Duration = Duration::from_secs(60);
pub const DAY: Duration = Duration::from_secs(86_400);
