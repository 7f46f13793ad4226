use crate::error::Result;
use crate::host::{Host, OpenTarget};
use crate::i18n::Messages;
use crate::settings::Settings;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuAction {
    Pin,
    Unpin,
    OpenInNewTab,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub action: MenuAction,
    pub label: String,
}

/// Context-menu entries for one row, in display order.
pub fn menu_entries(path: &str, settings: &Settings, msg: &Messages) -> Vec<MenuEntry> {
    let (pin, key) = if settings.is_pinned(path) {
        (MenuAction::Unpin, "menu.unpin")
    } else {
        (MenuAction::Pin, "menu.pin")
    };
    [
        (pin, key),
        (MenuAction::OpenInNewTab, "menu.openNewTab"),
        (MenuAction::Delete, "menu.delete"),
    ]
    .into_iter()
    .map(|(action, key)| MenuEntry {
        action,
        label: msg.get(key).to_string(),
    })
    .collect()
}

/// The confirmation shown before a delete.
pub fn confirm_delete_prompt(name: &str, msg: &Messages) -> String {
    msg.format("menu.confirmDelete", &[("name", name)])
}

/// Pins or unpins `path`; returns whether it is pinned afterwards.
pub fn toggle_pin(settings: &mut Settings, path: &str) -> bool {
    let pinned = settings.toggle_pin(path);
    tracing::debug!(path, pinned, "pin toggled");
    pinned
}

/// Moves `path` to the trash. A file that vanished in the meantime is
/// skipped and reported as `Ok(false)`.
pub fn delete_file<H: Host>(host: &H, path: &str) -> Result<bool> {
    if !host.exists(path) {
        tracing::debug!(path, "delete skipped; file already gone");
        return Ok(false);
    }
    host.trash(path)?;
    Ok(true)
}

/// Runs a menu action. Returns true when `settings` changed and should be
/// saved.
pub fn perform<H: Host>(
    action: MenuAction,
    path: &str,
    host: &H,
    settings: &mut Settings,
) -> Result<bool> {
    match action {
        MenuAction::Pin | MenuAction::Unpin => {
            toggle_pin(settings, path);
            Ok(true)
        }
        MenuAction::OpenInNewTab => {
            host.open(path, OpenTarget::NewTab)?;
            Ok(false)
        }
        MenuAction::Delete => {
            delete_file(host, path)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileRecord;
    use crate::host::MemHost;

    #[test]
    fn entries_follow_pin_state() {
        let mut s = Settings::default();
        let en = Messages::default();
        let actions = |s: &Settings| -> Vec<MenuAction> {
            menu_entries("a.md", s, &en).into_iter().map(|e| e.action).collect()
        };
        assert_eq!(
            actions(&s),
            vec![MenuAction::Pin, MenuAction::OpenInNewTab, MenuAction::Delete]
        );
        assert!(toggle_pin(&mut s, "a.md"));
        assert_eq!(actions(&s)[0], MenuAction::Unpin);
        assert_eq!(menu_entries("a.md", &s, &en)[0].label, "Unpin");
        assert!(!toggle_pin(&mut s, "a.md"));
        assert!(s.pinned_notes.is_empty());
    }

    #[test]
    fn delete_probes_existence_first() {
        let host = MemHost::new();
        host.put(FileRecord::new("a.md", 1, 1), "x");
        assert!(delete_file(&host, "a.md").unwrap());
        assert!(!delete_file(&host, "a.md").unwrap());
        assert_eq!(host.trashed(), vec!["a.md"]);
    }

    #[test]
    fn perform_reports_settings_changes() {
        let host = MemHost::new();
        host.put(FileRecord::new("a.md", 1, 1), "x");
        let mut s = Settings::default();
        assert!(perform(MenuAction::Pin, "a.md", &host, &mut s).unwrap());
        assert!(s.is_pinned("a.md"));
        assert!(!perform(MenuAction::OpenInNewTab, "a.md", &host, &mut s).unwrap());
        assert_eq!(host.opened(), vec![("a.md".to_string(), OpenTarget::NewTab)]);
        assert_eq!(
            confirm_delete_prompt("a", &Messages::default()),
            "Delete \"a\"?"
        );
    }
}
