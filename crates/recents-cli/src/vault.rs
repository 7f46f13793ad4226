//! A directory of markdown notes and attachments acting as the host.

use anyhow::{bail, Result};
use recents_core::host::resolve_against;
use recents_core::preview::skip_frontmatter;
use recents_core::{Error, FileRecord, Frontmatter, Host, OpenTarget};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Notes larger than this are listed without front matter or tags.
const METADATA_READ_LIMIT: u64 = 1024 * 1024;

pub struct VaultHost {
    root: PathBuf,
    files: RwLock<Vec<FileRecord>>,
    active: Mutex<Option<(String, OpenTarget)>>,
}

impl VaultHost {
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("vault {} is not a directory", root.display());
        }
        let host = Self {
            root: root.to_path_buf(),
            files: RwLock::new(Vec::new()),
            active: Mutex::new(None),
        };
        host.rescan();
        Ok(host)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-reads the vault and returns the new snapshot. Notes whose size and
    /// modification time are unchanged keep their parsed metadata.
    pub fn rescan(&self) -> Vec<FileRecord> {
        let previous = self.files();
        let files = scan_with(&self.root, &previous);
        *self.files.write().unwrap_or_else(PoisonError::into_inner) = files.clone();
        files
    }

    /// The file most recently opened through the host.
    pub fn active(&self) -> Option<(String, OpenTarget)> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn active_path(&self) -> Option<String> {
        self.active().map(|(p, _)| p)
    }

    /// `rel` under the root; `None` for absolute paths or ones that climb out.
    fn abs(&self, rel: &str) -> Option<PathBuf> {
        let rel = Path::new(rel);
        let inside = rel.components().count() > 0
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        inside.then(|| self.root.join(rel))
    }

    fn forget(&self, rel: &str) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|f| f.path != rel);
    }
}

impl Host for VaultHost {
    fn files(&self) -> Vec<FileRecord> {
        self.files.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn read_text(&self, path: &str) -> recents_core::Result<String> {
        let Some(abs) = self.abs(path) else {
            return Err(Error::NotFound(path.to_string()));
        };
        match tokio::fs::read(abs).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve_link(&self, target: &str, source: &str) -> Option<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        resolve_against(files.iter().map(|f| f.path.as_str()), target, source)
    }

    fn exists(&self, path: &str) -> bool {
        self.abs(path).is_some_and(|p| p.is_file())
    }

    fn open(&self, path: &str, target: OpenTarget) -> recents_core::Result<()> {
        if !self.exists(path) {
            return Err(Error::NotFound(path.to_string()));
        }
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((path.to_string(), target));
        Ok(())
    }

    /// Moves the file under `<vault>/.trash/`, keeping its folder layout.
    fn trash(&self, path: &str) -> recents_core::Result<()> {
        let src = match self.abs(path) {
            Some(src) if src.is_file() => src,
            _ => return Err(Error::NotFound(path.to_string())),
        };
        let dest = free_name(&self.root.join(".trash").join(path));
        if let Some(dir) = dest.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::rename(&src, &dest)?;
        self.forget(path);
        tracing::debug!(path, dest = %dest.display(), "moved to trash");
        Ok(())
    }
}

/// `dest`, or `name 1.ext`, `name 2.ext`, ... when taken.
fn free_name(dest: &Path) -> PathBuf {
    if !dest.exists() {
        return dest.to_path_buf();
    }
    let stem = dest.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = dest.extension().and_then(|s| s.to_str());
    (1..)
        .map(|n| {
            let name = match ext {
                Some(ext) => format!("{stem} {n}.{ext}"),
                None => format!("{stem} {n}"),
            };
            dest.with_file_name(name)
        })
        .find(|p| !p.exists())
        .unwrap_or_else(|| dest.to_path_buf())
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Every file under `root`, dot-entries skipped, in file-name order.
pub fn scan(root: &Path) -> Vec<FileRecord> {
    scan_with(root, &[])
}

/// `scan`, reusing the front matter and tags of `previous` records whose
/// size and modification time still match, so only changed notes are read.
pub fn scan_with(root: &Path, previous: &[FileRecord]) -> Vec<FileRecord> {
    let known: HashMap<&str, &FileRecord> = previous.iter().map(|f| (f.path.as_str(), f)).collect();
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| record_for(root, e.path(), &known))
        .collect()
}

fn record_for(root: &Path, path: &Path, known: &HashMap<&str, &FileRecord>) -> Option<FileRecord> {
    let rel = path.strip_prefix(root).ok()?;
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let meta = path.metadata().ok()?;
    let modified_at = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    if let Some(prev) = known.get(rel.as_str()) {
        if prev.size == meta.len() && prev.modified_at == modified_at {
            return Some((*prev).clone());
        }
    }
    let mut record = FileRecord::new(rel, meta.len(), modified_at);
    if record.is_markdown() && meta.len() <= METADATA_READ_LIMIT {
        if let Ok(content) = std::fs::read_to_string(path) {
            let fm = parse_frontmatter(&content);
            record.tags = extract_tags(fm.as_ref(), skip_frontmatter(&content));
            record.frontmatter = fm;
        }
    }
    Some(record)
}

/// The leading `---` YAML block as a JSON-shaped map.
pub fn parse_frontmatter(content: &str) -> Option<Frontmatter> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;
    let mut end = None;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            end = Some(offset);
            break;
        }
        offset += line.len();
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(&rest[..end?]).ok()?;
    match serde_json::to_value(yaml).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn inline_tag_pattern() -> &'static Regex {
    static P: OnceLock<Regex> = OnceLock::new();
    P.get_or_init(|| Regex::new(r"(?:^|[\s(])#([A-Za-z][A-Za-z0-9_/-]*)").expect("static pattern"))
}

/// Front-matter `tags` (a list or a comma/space separated string) followed
/// by inline `#tags` outside fenced code.
pub fn extract_tags(fm: Option<&Frontmatter>, body: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut add = |t: &str| {
        let t = t.trim().trim_start_matches('#');
        if !t.is_empty() && !tags.iter().any(|x| x == t) {
            tags.push(t.to_string());
        }
    };
    match fm.and_then(|m| m.get("tags")) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).for_each(&mut add),
        Some(Value::String(s)) => s.split([',', ' ']).for_each(&mut add),
        _ => {}
    }
    let mut in_code = false;
    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }
        for cap in inline_tag_pattern().captures_iter(line) {
            add(&cap[1]);
        }
    }
    tags
}
