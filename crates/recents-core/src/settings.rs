//! User settings: defaults, load-merge-over-defaults, single-field edits and
//! the control descriptors a settings panel renders.

use crate::error::{Error, Result};
use crate::file::FileKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// `dateFormat` value selecting "N days ago" style dates.
pub const RELATIVE_DATE_FORMAT: &str = "RELATIVE";

pub const MAX_PREVIEW_LINES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Comfortable,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailPosition {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Cap on unpinned rows; pinned rows are never cut.
    pub max_notes_to_show: usize,
    pub show_markdown_files: bool,
    pub show_image_files: bool,
    #[serde(rename = "showPDFFiles")]
    pub show_pdf_files: bool,
    pub show_audio_files: bool,
    pub show_video_files: bool,
    pub show_canvas_files: bool,
    #[serde(rename = "showCSVFiles")]
    pub show_csv_files: bool,
    pub show_base_files: bool,
    pub excluded_folders: Vec<String>,
    pub excluded_files: Vec<String>,
    pub excluded_tags: Vec<String>,
    pub preview_lines: u8,
    pub show_time: bool,
    pub show_folder_name: bool,
    pub pinned_notes: Vec<String>,
    /// `RELATIVE` or a date pattern such as `DD/MM/YYYY`.
    pub date_format: String,
    /// Front-matter key overriding the file-system modification time.
    pub property_modified: String,
    pub density: Density,
    pub thumbnail_property: String,
    pub thumbnail_position: ThumbnailPosition,
    pub show_thumbnail: bool,
    pub page_step_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_notes_to_show: 100,
            show_markdown_files: true,
            show_image_files: true,
            show_pdf_files: true,
            show_audio_files: false,
            show_video_files: false,
            show_canvas_files: true,
            show_csv_files: false,
            show_base_files: false,
            excluded_folders: Vec::new(),
            excluded_files: Vec::new(),
            excluded_tags: Vec::new(),
            preview_lines: 1,
            show_time: true,
            show_folder_name: false,
            pinned_notes: Vec::new(),
            date_format: "DD/MM/YYYY".into(),
            property_modified: String::new(),
            density: Density::Comfortable,
            thumbnail_property: "thumbnail".into(),
            thumbnail_position: ThumbnailPosition::Right,
            show_thumbnail: false,
            page_step_size: 10,
        }
    }
}

impl Settings {
    pub fn shows(&self, kind: FileKind) -> bool {
        match kind {
            FileKind::Markdown => self.show_markdown_files,
            FileKind::Image => self.show_image_files,
            FileKind::Pdf => self.show_pdf_files,
            FileKind::Audio => self.show_audio_files,
            FileKind::Video => self.show_video_files,
            FileKind::Canvas => self.show_canvas_files,
            FileKind::Csv => self.show_csv_files,
            FileKind::Base => self.show_base_files,
        }
    }

    pub fn is_relative_dates(&self) -> bool {
        self.date_format == RELATIVE_DATE_FORMAT
    }

    pub fn is_pinned(&self, path: &str) -> bool {
        self.pinned_notes.iter().any(|p| p == path)
    }

    /// Pins or unpins `path`; returns whether it is pinned afterwards.
    pub fn toggle_pin(&mut self, path: &str) -> bool {
        if self.is_pinned(path) {
            self.pinned_notes.retain(|p| p != path);
            false
        } else {
            self.pinned_notes.push(path.to_string());
            true
        }
    }

    /// Follows a rename; returns true when a pin was rewritten.
    pub fn rename_pin(&mut self, from: &str, to: &str) -> bool {
        let mut changed = false;
        for p in self.pinned_notes.iter_mut().filter(|p| p.as_str() == from) {
            *p = to.to_string();
            changed = true;
        }
        if changed {
            let mut seen = std::collections::HashSet::new();
            self.pinned_notes.retain(|p| seen.insert(p.clone()));
        }
        changed
    }

    /// Builds settings from a persisted object, key by key over the defaults.
    /// A key whose value does not fit its field keeps the default.
    pub fn from_value(stored: Value) -> Self {
        let Value::Object(stored) = stored else {
            tracing::warn!("stored settings are not an object; using defaults");
            return Self::default();
        };
        let Ok(Value::Object(mut merged)) = serde_json::to_value(Self::default()) else {
            return Self::default();
        };
        for (key, value) in stored {
            let previous = merged.insert(key.clone(), value);
            if serde_json::from_value::<Settings>(Value::Object(merged.clone())).is_err() {
                tracing::warn!(key = %key, "ignoring stored setting with an unusable value");
                match previous {
                    Some(p) => merged.insert(key, p),
                    None => merged.remove(&key),
                };
            }
        }
        serde_json::from_value::<Settings>(Value::Object(merged))
            .unwrap_or_default()
            .normalized()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(v))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(s)?;
        let v = serde_json::to_value(table)?;
        Ok(Self::from_value(v))
    }

    /// Missing file means defaults; a malformed file is logged and also
    /// yields defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable settings; using defaults"
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.preview_lines = self.preview_lines.min(MAX_PREVIEW_LINES);
        self.page_step_size = self.page_step_size.max(1);
        if self.date_format.trim().is_empty() {
            self.date_format = Settings::default().date_format;
        }
        self.excluded_folders = folder_list(&self.excluded_folders.join("\n"));
        self.excluded_files = text_list(&self.excluded_files.join("\n"));
        self.excluded_tags = tag_list(&self.excluded_tags.join("\n"));
        self
    }

    /// Applies one edit from a settings control. On error nothing changes.
    pub fn apply(&mut self, key: &str, raw: &str) -> Result<()> {
        let v = raw.trim();
        match key {
            "maxNotesToShow" => self.max_notes_to_show = parse_count(key, v, 0)?,
            "showMarkdownFiles" => self.show_markdown_files = parse_bool(key, v)?,
            "showImageFiles" => self.show_image_files = parse_bool(key, v)?,
            "showPDFFiles" => self.show_pdf_files = parse_bool(key, v)?,
            "showAudioFiles" => self.show_audio_files = parse_bool(key, v)?,
            "showVideoFiles" => self.show_video_files = parse_bool(key, v)?,
            "showCanvasFiles" => self.show_canvas_files = parse_bool(key, v)?,
            "showCSVFiles" => self.show_csv_files = parse_bool(key, v)?,
            "showBaseFiles" => self.show_base_files = parse_bool(key, v)?,
            "excludedFolders" => self.excluded_folders = folder_list(raw),
            "excludedFiles" => self.excluded_files = text_list(raw),
            "excludedTags" => self.excluded_tags = tag_list(raw),
            "previewLines" => {
                let n = parse_count(key, v, 0)?;
                if n > MAX_PREVIEW_LINES as usize {
                    return Err(Error::invalid(key, "must be between 0 and 3"));
                }
                self.preview_lines = n as u8;
            }
            "showTime" => self.show_time = parse_bool(key, v)?,
            "showFolderName" => self.show_folder_name = parse_bool(key, v)?,
            "pinnedNotes" => self.pinned_notes = text_list(raw),
            "dateFormat" => {
                if v.is_empty() {
                    return Err(Error::invalid(key, "must not be empty"));
                }
                self.date_format = v.to_string();
            }
            "propertyModified" => self.property_modified = v.to_string(),
            "density" => {
                self.density = match v {
                    "comfortable" => Density::Comfortable,
                    "compact" => Density::Compact,
                    _ => return Err(Error::invalid(key, "expected comfortable or compact")),
                }
            }
            "thumbnailProperty" => self.thumbnail_property = v.to_string(),
            "thumbnailPosition" => {
                self.thumbnail_position = match v {
                    "left" => ThumbnailPosition::Left,
                    "right" => ThumbnailPosition::Right,
                    _ => return Err(Error::invalid(key, "expected left or right")),
                }
            }
            "showThumbnail" => self.show_thumbnail = parse_bool(key, v)?,
            "pageStepSize" => self.page_step_size = parse_count(key, v, 1)?,
            _ => return Err(Error::UnknownSetting(key.to_string())),
        }
        Ok(())
    }

    /// Current value of `key` as the text a control would show.
    pub fn value_text(&self, key: &str) -> Option<String> {
        let s = match key {
            "maxNotesToShow" => self.max_notes_to_show.to_string(),
            "showMarkdownFiles" => self.show_markdown_files.to_string(),
            "showImageFiles" => self.show_image_files.to_string(),
            "showPDFFiles" => self.show_pdf_files.to_string(),
            "showAudioFiles" => self.show_audio_files.to_string(),
            "showVideoFiles" => self.show_video_files.to_string(),
            "showCanvasFiles" => self.show_canvas_files.to_string(),
            "showCSVFiles" => self.show_csv_files.to_string(),
            "showBaseFiles" => self.show_base_files.to_string(),
            "excludedFolders" => self.excluded_folders.join("\n"),
            "excludedFiles" => self.excluded_files.join("\n"),
            "excludedTags" => self.excluded_tags.join("\n"),
            "previewLines" => self.preview_lines.to_string(),
            "showTime" => self.show_time.to_string(),
            "showFolderName" => self.show_folder_name.to_string(),
            "pinnedNotes" => self.pinned_notes.join("\n"),
            "dateFormat" => self.date_format.clone(),
            "propertyModified" => self.property_modified.clone(),
            "density" => match self.density {
                Density::Comfortable => "comfortable".into(),
                Density::Compact => "compact".into(),
            },
            "thumbnailProperty" => self.thumbnail_property.clone(),
            "thumbnailPosition" => match self.thumbnail_position {
                ThumbnailPosition::Left => "left".into(),
                ThumbnailPosition::Right => "right".into(),
            },
            "showThumbnail" => self.show_thumbnail.to_string(),
            "pageStepSize" => self.page_step_size.to_string(),
            _ => return None,
        };
        Some(s)
    }
}

fn parse_count(key: &str, v: &str, min: usize) -> Result<usize> {
    let n: usize = v
        .parse()
        .map_err(|_| Error::invalid(key, format!("`{v}` is not a whole number")))?;
    if n < min {
        return Err(Error::invalid(key, format!("must be at least {min}")));
    }
    Ok(n)
}

fn parse_bool(key: &str, v: &str) -> Result<bool> {
    match v.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(Error::invalid(key, format!("`{v}` is not on/off"))),
    }
}

fn text_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn folder_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|l| l.trim().trim_matches('/'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn tag_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|l| l.trim().trim_start_matches('#'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Toggle,
    Dropdown(&'static [&'static str]),
    Slider { min: u32, max: u32 },
    /// One entry per line.
    TextList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub kind: ControlKind,
}

const fn control(
    key: &'static str,
    label: &'static str,
    description: &'static str,
    kind: ControlKind,
) -> Control {
    Control {
        key,
        label,
        description,
        kind,
    }
}

/// Every configurable field, in panel order.
pub fn controls() -> &'static [Control] {
    use ControlKind::*;
    const CONTROLS: &[Control] = &[
        control(
            "maxNotesToShow",
            "Maximum notes to show",
            "How many recent files to list, pinned files excluded",
            Text,
        ),
        control("showMarkdownFiles", "Show markdown files", "", Toggle),
        control("showImageFiles", "Show image files", "png, jpg, jpeg, gif, bmp, svg", Toggle),
        control("showPDFFiles", "Show PDF files", "", Toggle),
        control(
            "showAudioFiles",
            "Show audio files",
            "mp3, wav, m4a, ogg, 3gp, flac, webm, aac",
            Toggle,
        ),
        control("showVideoFiles", "Show video files", "mp4, webm, ogv, mov, mkv", Toggle),
        control("showCanvasFiles", "Show canvas files", "", Toggle),
        control("showCSVFiles", "Show CSV files", "", Toggle),
        control("showBaseFiles", "Show base files", "", Toggle),
        control("excludedFolders", "Excluded folders", "One folder path per line", TextList),
        control("excludedFiles", "Excluded files", "One file path per line", TextList),
        control("excludedTags", "Excluded tags", "One tag per line, with or without #", TextList),
        control(
            "previewLines",
            "Preview lines",
            "Lines of text shown under each note",
            Slider { min: 0, max: 3 },
        ),
        control("showTime", "Show time", "Show the modification date or time", Toggle),
        control("showFolderName", "Show folder name", "", Toggle),
        control("pinnedNotes", "Pinned notes", "One file path per line", TextList),
        control("dateFormat", "Date format", "RELATIVE or a pattern such as DD/MM/YYYY", Text),
        control(
            "propertyModified",
            "Modified date property",
            "Front-matter key used instead of the file modification time",
            Text,
        ),
        control("density", "Density", "", Dropdown(&["comfortable", "compact"])),
        control(
            "thumbnailProperty",
            "Thumbnail property",
            "Front-matter key holding an image link or URL",
            Text,
        ),
        control("thumbnailPosition", "Thumbnail position", "", Dropdown(&["left", "right"])),
        control("showThumbnail", "Show thumbnails", "", Toggle),
        control(
            "pageStepSize",
            "Page step size",
            "Rows moved by the page navigation commands",
            Text,
        ),
    ];
    CONTROLS
}
