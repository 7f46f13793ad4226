use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Frontmatter = Map<String, Value>;

/// One entry of the host's file index. Borrowed for a single refresh pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub extension: String,
    pub size: u64,
    /// Milliseconds since the unix epoch, as reported by the file system.
    pub modified_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FileRecord {
    pub fn new<S: Into<String>>(path: S, size: u64, modified_at: i64) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            extension,
            size,
            modified_at,
            frontmatter: None,
            tags: Vec::new(),
        }
    }

    pub fn with_frontmatter(mut self, fm: Frontmatter) -> Self {
        self.frontmatter = Some(fm);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// File name including the extension.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without the extension.
    pub fn basename(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(i) => &name[..i],
        }
    }

    /// Parent folder, `None` at the vault root.
    pub fn folder(&self) -> Option<&str> {
        self.path.rfind('/').map(|i| &self.path[..i])
    }

    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }

    pub fn frontmatter_value(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return None;
        }
        self.frontmatter.as_ref()?.get(key)
    }

    /// A front-matter value rendered as a trimmed, non-empty string.
    pub fn frontmatter_str(&self, key: &str) -> Option<String> {
        let s = match self.frontmatter_value(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            // YAML `[[link]]` without quotes parses as a nested list
            Value::Array(items) => match items.as_slice() {
                [Value::Array(inner)] => match inner.as_slice() {
                    [Value::String(s)] => format!("[[{}]]", s.trim()),
                    _ => return None,
                },
                [Value::String(s)] => s.trim().to_string(),
                _ => return None,
            },
            _ => return None,
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}

pub fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(i) => name[i + 1..].to_ascii_lowercase(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Markdown,
    Image,
    Pdf,
    Audio,
    Video,
    Canvas,
    Csv,
    Base,
}

impl FileKind {
    pub const ALL: [FileKind; 8] = [
        FileKind::Markdown,
        FileKind::Image,
        FileKind::Pdf,
        FileKind::Audio,
        FileKind::Video,
        FileKind::Canvas,
        FileKind::Csv,
        FileKind::Base,
    ];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Markdown => &["md"],
            FileKind::Image => &["png", "jpg", "jpeg", "gif", "bmp", "svg"],
            FileKind::Pdf => &["pdf"],
            FileKind::Audio => &["mp3", "wav", "m4a", "ogg", "3gp", "flac", "webm", "aac"],
            FileKind::Video => &["mp4", "webm", "ogv", "mov", "mkv"],
            FileKind::Canvas => &["canvas"],
            FileKind::Csv => &["csv"],
            FileKind::Base => &["base"],
        }
    }

    /// Every category an extension belongs to. `webm` is both audio and video.
    pub fn kinds_of(ext: &str) -> impl Iterator<Item = FileKind> + '_ {
        Self::ALL
            .into_iter()
            .filter(move |k| k.extensions().contains(&ext))
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Markdown => "Markdown",
            FileKind::Image => "Image",
            FileKind::Pdf => "PDF",
            FileKind::Audio => "Audio",
            FileKind::Video => "Video",
            FileKind::Canvas => "Canvas",
            FileKind::Csv => "CSV",
            FileKind::Base => "Base",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_folders() {
        let f = FileRecord::new("Projects/2024/Plan.v2.MD", 10, 0);
        assert_eq!(f.extension, "md");
        assert_eq!(f.name(), "Plan.v2.MD");
        assert_eq!(f.basename(), "Plan.v2");
        assert_eq!(f.folder(), Some("Projects/2024"));

        let root = FileRecord::new("inbox.md", 1, 0);
        assert_eq!(root.folder(), None);
        let dotfile = FileRecord::new(".hidden", 1, 0);
        assert_eq!(dotfile.extension, "");
        assert_eq!(dotfile.basename(), ".hidden");
    }

    #[test]
    fn webm_is_audio_and_video() {
        let kinds: Vec<_> = FileKind::kinds_of("webm").collect();
        assert_eq!(kinds, vec![FileKind::Audio, FileKind::Video]);
        assert_eq!(FileKind::kinds_of("txt").count(), 0);
    }

    #[test]
    fn frontmatter_strings() {
        let mut fm = Frontmatter::new();
        fm.insert("title".into(), Value::String("  Hello ".into()));
        fm.insert("blank".into(), Value::String("  ".into()));
        fm.insert(
            "cover".into(),
            serde_json::json!([["images/cover.png"]]),
        );
        let f = FileRecord::new("a.md", 1, 0).with_frontmatter(fm);
        assert_eq!(f.frontmatter_str("title").as_deref(), Some("Hello"));
        assert_eq!(f.frontmatter_str("blank"), None);
        assert_eq!(f.frontmatter_str(""), None);
        assert_eq!(
            f.frontmatter_str("cover").as_deref(),
            Some("[[images/cover.png]]")
        );
    }
}
