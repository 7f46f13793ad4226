//! The recent-files view model: one refresh pass turns the host's file index
//! into display rows, consulting the preview and thumbnail caches before any
//! content read.

use crate::bucket::{group_sections, Section};
use crate::cache::{PreviewCache, ThumbnailCache};
use crate::datefmt::{daily_note_qualifier, date_text};
use crate::error::Result;
use crate::events::{ChangeBatch, ChangeEvent, RefreshGate, RefreshTicket};
use crate::file::{FileKind, FileRecord};
use crate::filter::shown_kind;
use crate::host::{Host, OpenTarget};
use crate::i18n::Messages;
use crate::nav::{adjacent, page, position, reference_path, start, Direction, HasPath};
use crate::ordering::{build_ordered_list_in, Ranked};
use crate::preview::{csv_first_line, file_summary, markdown_preview_lines, PREVIEW_SIZE_LIMIT};
use crate::settings::Settings;
use crate::thumbnail::{self, Lookup};
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub file: FileRecord,
    pub section: Section,
    pub section_label: String,
    pub display_name: String,
    pub date_text: String,
    pub preview_lines: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub folder: Option<String>,
    pub pinned: bool,
}

impl HasPath for DisplayRow {
    fn path(&self) -> &str {
        &self.file.path
    }
}

/// User-invocable actions on the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenList,
    Previous,
    Next,
    PreviousPage,
    NextPage,
    MoveToStart,
}

/// Preview text that either needs the file body or is already known.
enum PreviewPlan {
    Ready(String),
    Read,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RecentView {
    settings: Settings,
    messages: Messages,
    previews: Mutex<PreviewCache>,
    thumbnails: Mutex<ThumbnailCache>,
    gate: RefreshGate,
    visible: AtomicBool,
}

impl RecentView {
    pub fn new(settings: Settings, messages: Messages) -> Self {
        Self {
            settings,
            messages,
            previews: Mutex::new(PreviewCache::default()),
            thumbnails: Mutex::new(ThumbnailCache::default()),
            gate: RefreshGate::new(),
            visible: AtomicBool::new(true),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Replaces the settings. Cached previews and thumbnails depend on them,
    /// so both caches are emptied.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        lock(&self.previews).clear();
        lock(&self.thumbnails).clear();
        debug!("settings replaced; caches cleared");
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn cached_previews(&self) -> usize {
        lock(&self.previews).len()
    }

    pub fn cached_thumbnails(&self) -> usize {
        lock(&self.thumbnails).len()
    }

    /// Drops expired cache entries; returns how many went.
    pub fn sweep(&self, now_ms: i64) -> usize {
        let n = lock(&self.previews).sweep(now_ms) + lock(&self.thumbnails).sweep(now_ms);
        if n > 0 {
            debug!(evicted = n, "cache sweep");
        }
        n
    }

    pub fn invalidate(&self, path: &str) {
        lock(&self.previews).invalidate(path);
        lock(&self.thumbnails).invalidate(path);
    }

    /// Applies a batch of host notifications to the caches and pins.
    /// Returns true when `pinnedNotes` changed and should be saved.
    pub fn apply_changes(&mut self, batch: &ChangeBatch) -> bool {
        let mut pins_changed = false;
        for event in &batch.events {
            match event {
                ChangeEvent::Modified { path } | ChangeEvent::Deleted { path } => {
                    self.invalidate(path)
                }
                ChangeEvent::Renamed { from, to } => {
                    self.invalidate(from);
                    pins_changed |= self.settings.rename_pin(from, to);
                }
                ChangeEvent::Created { .. } | ChangeEvent::ActiveChanged { .. } => {}
            }
        }
        debug!(events = batch.len(), pins_changed, "change batch applied");
        pins_changed
    }

    /// One full pass over the host's index. `None` when a newer pass started
    /// while this one was waiting on a read.
    pub async fn refresh<H: Host, Tz: TimeZone>(
        &self,
        host: &H,
        now: &DateTime<Tz>,
    ) -> Option<Vec<DisplayRow>> {
        let ticket = self.gate.begin();
        let list = build_ordered_list_in(host.files(), &self.settings, &now.timezone());
        debug!(generation = ticket.generation(), rows = list.len(), "refresh pass started");
        let mut rows = Vec::with_capacity(list.len());
        for (section, items) in group_sections(&list, now) {
            let label = section.label(&self.messages);
            for ranked in items {
                let projected = self
                    .project_row(host, ranked, section, &label, now, &ticket)
                    .await;
                let Some(row) = projected else {
                    debug!(generation = ticket.generation(), "stale refresh pass dropped");
                    return None;
                };
                rows.push(row);
            }
        }
        Some(rows)
    }

    async fn project_row<H: Host, Tz: TimeZone>(
        &self,
        host: &H,
        ranked: &Ranked,
        section: Section,
        section_label: &str,
        now: &DateTime<Tz>,
        ticket: &RefreshTicket,
    ) -> Option<DisplayRow> {
        let s = &self.settings;
        let file = &ranked.file;
        let now_ms = now.timestamp_millis();

        let cached_preview = if s.preview_lines > 0 {
            lock(&self.previews).get(&file.path, now_ms)
        } else {
            None
        };
        let cached_thumb = if s.show_thumbnail {
            lock(&self.thumbnails).get(&file.path, now_ms)
        } else {
            None
        };
        debug!(
            path = %file.path,
            preview_hit = cached_preview.is_some(),
            thumbnail_hit = cached_thumb.is_some(),
            "projecting row"
        );
        let preview_plan =
            (s.preview_lines > 0 && cached_preview.is_none()).then(|| self.plan_preview(file));
        let thumb_lookup = (s.show_thumbnail && cached_thumb.is_none())
            .then(|| thumbnail::from_record(file, s, host));

        let needs_read = file.size <= PREVIEW_SIZE_LIMIT
            && (matches!(preview_plan, Some(PreviewPlan::Read))
                || thumb_lookup == Some(Lookup::NeedsBody));
        let body = if needs_read {
            match host.read_text(&file.path).await {
                Ok(b) => Some(b),
                Err(e) => {
                    warn!(path = %file.path, error = %e, "content read failed");
                    None
                }
            }
        } else {
            None
        };

        let preview = match (cached_preview, preview_plan) {
            (Some(text), _) => text,
            (None, Some(plan)) => {
                let text = match plan {
                    PreviewPlan::Ready(text) => text,
                    PreviewPlan::Read => self.preview_from_body(file, body.as_deref()),
                };
                lock(&self.previews).insert(&file.path, text.clone(), now_ms);
                text
            }
            (None, None) => String::new(),
        };
        let thumbnail_url = match (cached_thumb, thumb_lookup) {
            (Some(url), _) => url,
            (None, Some(lookup)) => {
                let url = match lookup {
                    Lookup::Found(url) => url,
                    Lookup::NeedsBody => body
                        .as_deref()
                        .and_then(|b| thumbnail::from_body(file, b, host)),
                };
                lock(&self.thumbnails).insert(&file.path, url.clone(), now_ms);
                url
            }
            (None, None) => None,
        };

        if needs_read && !ticket.is_current() {
            return None;
        }

        Some(DisplayRow {
            file: file.clone(),
            section,
            section_label: section_label.to_string(),
            display_name: display_name(file, now.date_naive(), &self.messages),
            date_text: date_text(ranked.effective_at, now, s, &self.messages),
            preview_lines: preview.lines().filter(|l| !l.is_empty()).map(str::to_string).collect(),
            thumbnail_url,
            folder: s
                .show_folder_name
                .then(|| file.folder().map(str::to_string))
                .flatten(),
            pinned: section == Section::Pinned,
        })
    }

    fn plan_preview(&self, file: &FileRecord) -> PreviewPlan {
        let kind = shown_kind(file, &self.settings).unwrap_or(FileKind::Markdown);
        match kind {
            FileKind::Markdown if file.size > PREVIEW_SIZE_LIMIT => {
                PreviewPlan::Ready(self.messages.get("preview.tooLarge").to_string())
            }
            FileKind::Markdown => PreviewPlan::Read,
            FileKind::Csv if file.size <= PREVIEW_SIZE_LIMIT => PreviewPlan::Read,
            kind => PreviewPlan::Ready(file_summary(kind, file.size, &self.messages)),
        }
    }

    fn preview_from_body(&self, file: &FileRecord, body: Option<&str>) -> String {
        let msg = &self.messages;
        if !file.is_markdown() {
            let summary = file_summary(FileKind::Csv, file.size, msg);
            return match body.map(csv_first_line) {
                Some(line) if !line.is_empty() => format!("{summary}\n{line}"),
                _ => summary,
            };
        }
        let Some(body) = body else {
            return msg.get("preview.unreadable").to_string();
        };
        let lines = markdown_preview_lines(body, self.settings.preview_lines as usize);
        if lines.is_empty() {
            msg.get("preview.empty").to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Runs a list command. `OpenList` reveals the list and returns the row
    /// to focus without opening anything; the movement commands open the row
    /// they land on and do nothing while the list is hidden.
    pub fn dispatch<H: Host>(
        &self,
        host: &H,
        command: Command,
        rows: &[DisplayRow],
        focused: Option<&str>,
        active: Option<&str>,
    ) -> Result<Option<String>> {
        let current = reference_path(focused, active);
        if command == Command::OpenList {
            self.set_visible(true);
            let row = position(rows, current)
                .and_then(|i| rows.get(i))
                .or_else(|| start(rows));
            return Ok(row.map(|r| r.file.path.clone()));
        }
        if !self.is_visible() {
            return Ok(None);
        }
        let step = self.settings.page_step_size;
        let target = match command {
            Command::Previous => adjacent(rows, current, Direction::Up),
            Command::Next => adjacent(rows, current, Direction::Down),
            Command::PreviousPage => page(rows, current, Direction::Up, step),
            Command::NextPage => page(rows, current, Direction::Down, step),
            Command::MoveToStart | Command::OpenList => start(rows),
        };
        let Some(row) = target else {
            return Ok(None);
        };
        host.open(&row.file.path, OpenTarget::Current)?;
        Ok(Some(row.file.path.clone()))
    }
}

/// Title property (markdown) or base name, plus the daily-note qualifier.
pub fn display_name(file: &FileRecord, today: NaiveDate, msg: &Messages) -> String {
    let name = file
        .is_markdown()
        .then(|| file.frontmatter_str("title"))
        .flatten()
        .unwrap_or_else(|| file.basename().to_string());
    match daily_note_qualifier(file.basename(), today, msg) {
        Some(q) => format!("{name} ({q})"),
        None => name,
    }
}

/// Contiguous runs of rows sharing a section, for rendering headers.
pub fn runs(rows: &[DisplayRow]) -> Vec<(&str, &[DisplayRow])> {
    let mut out = Vec::new();
    let mut begin = 0;
    for i in 1..=rows.len() {
        if i == rows.len() || rows[i].section != rows[begin].section {
            out.push((rows[begin].section_label.as_str(), &rows[begin..i]));
            begin = i;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn display_names() {
        let en = Messages::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let plain = FileRecord::new("notes/Plan.md", 1, 1);
        assert_eq!(display_name(&plain, today, &en), "Plan");
        let daily = FileRecord::new("daily/2024-06-14.md", 1, 1);
        assert_eq!(display_name(&daily, today, &en), "2024-06-14 (yesterday)");
        let fm = serde_json::json!({ "title": "Standup" });
        let titled = FileRecord::new("daily/2024-06-15.md", 1, 1)
            .with_frontmatter(fm.as_object().unwrap().clone());
        assert_eq!(display_name(&titled, today, &en), "Standup (today)");
        let image = FileRecord::new("a/photo.png", 1, 1);
        assert_eq!(display_name(&image, today, &en), "photo");
    }

    #[test]
    fn runs_split_on_section_change() {
        let row = |path: &str, section: Section| DisplayRow {
            file: FileRecord::new(path, 1, 1),
            section,
            section_label: format!("{section:?}"),
            display_name: path.into(),
            date_text: String::new(),
            preview_lines: Vec::new(),
            thumbnail_url: None,
            folder: None,
            pinned: false,
        };
        let rows = vec![
            row("a", Section::Today),
            row("b", Section::Today),
            row("c", Section::Yesterday),
        ];
        let r = runs(&rows);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].1.len(), 2);
        assert_eq!(r[1].0, "Yesterday");
        assert!(runs(&[]).is_empty());
    }

    #[tokio::test]
    async fn hidden_list_ignores_commands() {
        let host = crate::host::MemHost::new();
        host.put(FileRecord::new("a.md", 1, Utc::now().timestamp_millis()), "a");
        let view = RecentView::new(Settings::default(), Messages::default());
        let rows = view.refresh(&host, &Utc::now()).await.unwrap();
        view.set_visible(false);
        assert_eq!(view.dispatch(&host, Command::Next, &rows, None, None).unwrap(), None);
        assert!(host.opened().is_empty());
        view.set_visible(true);
        assert_eq!(
            view.dispatch(&host, Command::Next, &rows, None, None).unwrap().as_deref(),
            Some("a.md")
        );
    }

    #[tokio::test]
    async fn open_list_reveals_without_opening() {
        let host = crate::host::MemHost::new();
        let now = Utc::now().timestamp_millis();
        host.put(FileRecord::new("a.md", 1, now), "a");
        host.put(FileRecord::new("b.md", 1, now - 60_000), "b");
        let view = RecentView::new(Settings::default(), Messages::default());
        let rows = view.refresh(&host, &Utc::now()).await.unwrap();

        view.set_visible(false);
        let focus = view.dispatch(&host, Command::OpenList, &rows, None, Some("b.md")).unwrap();
        assert_eq!(focus.as_deref(), Some("b.md"));
        assert!(view.is_visible());

        let focus = view.dispatch(&host, Command::OpenList, &rows, None, None).unwrap();
        assert_eq!(focus.as_deref(), Some("a.md"));
        assert!(host.opened().is_empty());
    }
}
