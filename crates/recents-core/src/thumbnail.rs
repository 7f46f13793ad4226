//! Thumbnail lookup: an image is its own thumbnail; a note uses its
//! thumbnail property, else the first image it embeds.

use crate::file::{extension_of, FileKind, FileRecord};
use crate::host::{is_remote, Host};
use crate::settings::Settings;
use regex::Regex;
use std::sync::OnceLock;

/// What can be decided from the file record alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Option<String>),
    /// A markdown note without a usable property; its body has to be scanned.
    NeedsBody,
}

fn is_image(path: &str) -> bool {
    let ext = extension_of(path);
    FileKind::Image.extensions().contains(&ext.as_str())
}

fn embed_pattern() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    P.get_or_init(|| {
        Regex::new(r"!\[\[([^\]]+)\]\]|!\[[^\]]*\]\(([^)]+)\)").expect("static pattern")
    })
}

fn link_pattern() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    P.get_or_init(|| {
        Regex::new(r"^!?\[\[([^\]]+)\]\]$|^!?\[[^\]]*\]\(([^)]+)\)$").expect("static pattern")
    })
}

/// Turns a link target into a thumbnail URL: remote targets pass through,
/// local ones resolve through the host.
fn resolve<H: Host>(target: &str, source: &str, host: &H) -> Option<String> {
    let target = target.trim().trim_start_matches('<').trim_end_matches('>');
    if is_remote(target) {
        return Some(target.to_string());
    }
    host.resolve_link(target, source)
}

pub fn from_record<H: Host>(file: &FileRecord, settings: &Settings, host: &H) -> Lookup {
    if is_image(&file.path) {
        return Lookup::Found(Some(file.path.clone()));
    }
    if !file.is_markdown() {
        return Lookup::Found(None);
    }
    let Some(value) = file.frontmatter_str(&settings.thumbnail_property) else {
        return Lookup::NeedsBody;
    };
    let target = match link_pattern().captures(&value) {
        Some(c) => c.get(1).or_else(|| c.get(2)).map(|m| m.as_str().to_string()),
        None => Some(value),
    };
    match target.and_then(|t| resolve(&t, &file.path, host)) {
        Some(url) => Lookup::Found(Some(url)),
        None => Lookup::NeedsBody,
    }
}

/// The first embed in `body` that is remote or resolves to an image.
pub fn from_body<H: Host>(file: &FileRecord, body: &str, host: &H) -> Option<String> {
    embed_pattern().captures_iter(body).find_map(|c| {
        let target = c.get(1).or_else(|| c.get(2))?.as_str();
        let url = resolve(target, &file.path, host)?;
        (is_remote(&url) || is_image(&url)).then_some(url)
    })
}
