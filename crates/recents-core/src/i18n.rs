//! Flat message tables keyed by locale tag. `en` is the fallback for unknown
//! locales and for keys a locale does not translate.

use std::collections::HashMap;
use std::sync::OnceLock;

pub const FALLBACK_LOCALE: &str = "en";

type Table = HashMap<&'static str, &'static str>;

const EN: &[(&str, &str)] = &[
    ("view.title", "Recent files"),
    ("section.pinned", "Pinned"),
    ("section.today", "Today"),
    ("section.yesterday", "Yesterday"),
    ("section.previous7", "Previous 7 days"),
    ("section.previous30", "Previous 30 days"),
    ("date.today", "today"),
    ("date.yesterday", "yesterday"),
    ("date.tomorrow", "tomorrow"),
    ("date.daysAgo", "{n} days ago"),
    ("date.next", "next {day}"),
    ("date.last", "last {day}"),
    ("preview.empty", "No additional text"),
    ("preview.tooLarge", "File too large to preview"),
    ("preview.unreadable", "Could not read file"),
    ("preview.file", "{type} file"),
    ("menu.pin", "Pin"),
    ("menu.unpin", "Unpin"),
    ("menu.openNewTab", "Open in new tab"),
    ("menu.delete", "Delete"),
    ("menu.confirmDelete", "Delete \"{name}\"?"),
];

const FR: &[(&str, &str)] = &[
    ("view.title", "Fichiers récents"),
    ("section.pinned", "Épinglés"),
    ("section.today", "Aujourd'hui"),
    ("section.yesterday", "Hier"),
    ("section.previous7", "7 derniers jours"),
    ("section.previous30", "30 derniers jours"),
    ("date.today", "aujourd'hui"),
    ("date.yesterday", "hier"),
    ("date.tomorrow", "demain"),
    ("date.daysAgo", "il y a {n} jours"),
    ("preview.empty", "Aucun texte supplémentaire"),
    ("preview.tooLarge", "Fichier trop volumineux pour l'aperçu"),
    ("preview.unreadable", "Impossible de lire le fichier"),
    ("preview.file", "Fichier {type}"),
    ("menu.pin", "Épingler"),
    ("menu.unpin", "Désépingler"),
    ("menu.openNewTab", "Ouvrir dans un nouvel onglet"),
    ("menu.delete", "Supprimer"),
    ("menu.confirmDelete", "Supprimer « {name} » ?"),
];

const DE: &[(&str, &str)] = &[
    ("view.title", "Zuletzt geändert"),
    ("section.pinned", "Angeheftet"),
    ("section.today", "Heute"),
    ("section.yesterday", "Gestern"),
    ("section.previous7", "Letzte 7 Tage"),
    ("section.previous30", "Letzte 30 Tage"),
    ("date.today", "heute"),
    ("date.yesterday", "gestern"),
    ("date.tomorrow", "morgen"),
    ("date.daysAgo", "vor {n} Tagen"),
    ("preview.empty", "Kein weiterer Text"),
    ("preview.unreadable", "Datei konnte nicht gelesen werden"),
    ("preview.file", "{type}-Datei"),
    ("menu.pin", "Anheften"),
    ("menu.unpin", "Lösen"),
    ("menu.delete", "Löschen"),
];

const ES: &[(&str, &str)] = &[
    ("view.title", "Archivos recientes"),
    ("section.pinned", "Fijados"),
    ("section.today", "Hoy"),
    ("section.yesterday", "Ayer"),
    ("section.previous7", "Últimos 7 días"),
    ("section.previous30", "Últimos 30 días"),
    ("date.today", "hoy"),
    ("date.yesterday", "ayer"),
    ("date.tomorrow", "mañana"),
    ("date.daysAgo", "hace {n} días"),
    ("preview.empty", "Sin texto adicional"),
    ("preview.file", "Archivo {type}"),
    ("menu.pin", "Fijar"),
    ("menu.unpin", "Desfijar"),
    ("menu.delete", "Eliminar"),
];

fn tables() -> &'static HashMap<&'static str, Table> {
    static TABLES: OnceLock<HashMap<&'static str, Table>> = OnceLock::new();
    TABLES.get_or_init(|| {
        [("en", EN), ("fr", FR), ("de", DE), ("es", ES)]
            .into_iter()
            .map(|(tag, entries)| (tag, entries.iter().copied().collect()))
            .collect()
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: &'static str,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            locale: FALLBACK_LOCALE,
        }
    }
}

impl Messages {
    /// `fr-FR`, `fr_FR` and `FR` all select `fr`.
    pub fn for_locale(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let locale = tables()
            .keys()
            .copied()
            .find(|k| *k == primary)
            .unwrap_or(FALLBACK_LOCALE);
        Self { locale }
    }

    pub fn locale(&self) -> &'static str {
        self.locale
    }

    pub fn get(&self, key: &'static str) -> &'static str {
        let all = tables();
        all.get(self.locale)
            .and_then(|t| t.get(key))
            .or_else(|| all.get(FALLBACK_LOCALE).and_then(|t| t.get(key)))
            .copied()
            .unwrap_or(key)
    }

    /// `get` with `{name}` placeholders substituted.
    pub fn format(&self, key: &'static str, args: &[(&str, &str)]) -> String {
        let mut out = self.get(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}
