use anyhow::Result;
use recents_core::Settings;
use std::path::{Path, PathBuf};

pub fn config_dir(vault: &Path) -> PathBuf {
    vault.join(".recents")
}

pub fn settings_path(vault: &Path) -> PathBuf {
    config_dir(vault).join("settings.toml")
}

pub fn trash_dir(vault: &Path) -> PathBuf {
    vault.join(".trash")
}

pub fn load_settings(vault: &Path) -> Settings {
    Settings::load_from(&settings_path(vault))
}

pub fn save_settings(vault: &Path, settings: &Settings) -> Result<()> {
    settings.save_to(&settings_path(vault))?;
    Ok(())
}

/// Locale from the usual environment variables, `en` when unset.
pub fn env_locale() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.is_empty() && v != "C" && v != "POSIX")
        .unwrap_or_else(|| "en".to_string())
}
