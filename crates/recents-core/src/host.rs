//! The application the view model is embedded in: file index, content reads,
//! link resolution and the few side effects the list can trigger.

use crate::error::{Error, Result};
use crate::file::FileRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenTarget {
    Current,
    NewTab,
}

#[allow(async_fn_in_trait)]
pub trait Host {
    /// Snapshot of every file the host knows about.
    fn files(&self) -> Vec<FileRecord>;
    async fn read_text(&self, path: &str) -> Result<String>;
    /// Resolves an embed or link target written inside `source`.
    fn resolve_link(&self, target: &str, source: &str) -> Option<String>;
    fn exists(&self, path: &str) -> bool;
    fn open(&self, path: &str, target: OpenTarget) -> Result<()>;
    fn trash(&self, path: &str) -> Result<()>;
}

/// Link resolution over a set of known paths: exact path, then relative to
/// the source folder, then by file name with the shortest path winning.
/// A target without an extension also tries `.md`.
pub fn resolve_against<'a, I>(paths: I, target: &str, source: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = clean_link_target(target)?;
    let known: HashSet<&str> = paths.into_iter().collect();
    let mut wanted = vec![target.clone()];
    if !target.rsplit('/').next().unwrap_or("").contains('.') {
        wanted.push(format!("{target}.md"));
    }
    let folder = source.rfind('/').map(|i| &source[..i]);
    for w in &wanted {
        if known.contains(w.as_str()) {
            return Some(w.clone());
        }
        if let Some(folder) = folder {
            let rel = normalize(&format!("{folder}/{w}"));
            if known.contains(rel.as_str()) {
                return Some(rel);
            }
        }
    }
    for w in &wanted {
        let suffix = format!("/{w}");
        let best = known
            .iter()
            .filter(|p| p.ends_with(&suffix))
            .min_by_key(|p| (p.len(), **p));
        if let Some(best) = best {
            return Some(best.to_string());
        }
    }
    None
}

/// Strips `|alias`, `#heading`, angle brackets and `%20`; `None` for empty
/// or remote targets.
pub fn clean_link_target(raw: &str) -> Option<String> {
    let t = raw.trim().trim_start_matches('<').trim_end_matches('>');
    let t = t.split('|').next().unwrap_or("");
    let t = t.split('#').next().unwrap_or("");
    let t = t.trim().trim_start_matches("./").replace("%20", " ");
    if t.is_empty() || is_remote(&t) {
        return None;
    }
    Some(t.trim_start_matches('/').to_string())
}

pub fn is_remote(s: &str) -> bool {
    s.starts_with("http")
}

fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// In-memory host used by tests and demos.
#[derive(Default)]
pub struct MemHost {
    files: RwLock<Vec<FileRecord>>,
    contents: RwLock<HashMap<String, String>>,
    unreadable: RwLock<HashSet<String>>,
    opened: Mutex<Vec<(String, OpenTarget)>>,
    trashed: Mutex<Vec<String>>,
    reads: AtomicUsize,
}

impl MemHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file; `size` is kept from `file`.
    pub fn put(&self, file: FileRecord, content: &str) {
        let path = file.path.clone();
        let mut files = self.files.write().expect("poisoned");
        files.retain(|f| f.path != path);
        files.push(file);
        self.contents
            .write()
            .expect("poisoned")
            .insert(path, content.to_string());
    }

    /// Replaces content and bumps the modification time.
    pub fn modify(&self, path: &str, content: &str, modified_at: i64) {
        let mut files = self.files.write().expect("poisoned");
        if let Some(f) = files.iter_mut().find(|f| f.path == path) {
            f.modified_at = modified_at;
            f.size = content.len() as u64;
        }
        self.contents
            .write()
            .expect("poisoned")
            .insert(path.to_string(), content.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.files.write().expect("poisoned").retain(|f| f.path != path);
        self.contents.write().expect("poisoned").remove(path);
    }

    pub fn rename(&self, from: &str, to: &str) {
        let mut files = self.files.write().expect("poisoned");
        if let Some(f) = files.iter_mut().find(|f| f.path == from) {
            *f = FileRecord {
                path: to.to_string(),
                extension: crate::file::extension_of(to),
                ..f.clone()
            };
        }
        let mut contents = self.contents.write().expect("poisoned");
        if let Some(c) = contents.remove(from) {
            contents.insert(to.to_string(), c);
        }
    }

    /// Reads of `path` fail from now on.
    pub fn break_reads(&self, path: &str) {
        self.unreadable
            .write()
            .expect("poisoned")
            .insert(path.to_string());
    }

    /// Number of content reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<(String, OpenTarget)> {
        self.opened.lock().expect("poisoned").clone()
    }

    pub fn trashed(&self) -> Vec<String> {
        self.trashed.lock().expect("poisoned").clone()
    }
}

impl Host for MemHost {
    fn files(&self) -> Vec<FileRecord> {
        self.files.read().expect("poisoned").clone()
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unreadable.read().expect("poisoned").contains(path) {
            return Err(Error::Io(std::io::Error::other("read refused")));
        }
        self.contents
            .read()
            .expect("poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    fn resolve_link(&self, target: &str, source: &str) -> Option<String> {
        let files = self.files.read().expect("poisoned");
        resolve_against(files.iter().map(|f| f.path.as_str()), target, source)
    }

    fn exists(&self, path: &str) -> bool {
        self.files
            .read()
            .expect("poisoned")
            .iter()
            .any(|f| f.path == path)
    }

    fn open(&self, path: &str, target: OpenTarget) -> Result<()> {
        self.opened
            .lock()
            .expect("poisoned")
            .push((path.to_string(), target));
        Ok(())
    }

    fn trash(&self, path: &str) -> Result<()> {
        if !self.exists(path) {
            return Err(Error::NotFound(path.to_string()));
        }
        self.remove(path);
        self.trashed
            .lock()
            .expect("poisoned")
            .push(path.to_string());
        Ok(())
    }
}
