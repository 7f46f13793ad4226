use chrono::{DateTime, Duration, TimeZone, Utc};
use recents_core::cache::CACHE_TTL_MS;
use recents_core::error::Result;
use recents_core::{
    ChangeBatch, ChangeEvent, Command, FileRecord, Host, MemHost, Messages, OpenTarget, RecentView,
    RefreshGate,
    Section, Settings,
};
use serde_json::json;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn ago(d: Duration) -> i64 {
    (now() - d).timestamp_millis()
}

fn view(settings: serde_json::Value) -> RecentView {
    RecentView::new(Settings::from_value(settings), Messages::default())
}

fn batch(events: Vec<ChangeEvent>) -> ChangeBatch {
    ChangeBatch { events }
}

#[tokio::test]
async fn rows_carry_sections_names_and_previews() {
    let host = MemHost::new();
    host.put(
        FileRecord::new("A.md", 40, ago(Duration::minutes(2))),
        "---\ntitle: X\n---\n\n# Heading\nBody text",
    );
    host.put(FileRecord::new("B.md", 10, ago(Duration::hours(26))), "");
    host.put(FileRecord::new("C.png", 2048, ago(Duration::days(40))), "");
    let v = view(json!({ "maxNotesToShow": 10 }));
    let rows = v.refresh(&host, &now()).await.unwrap();

    let shape: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.file.path.as_str(), r.section_label.as_str()))
        .collect();
    assert_eq!(shape, vec![("A.md", "Today"), ("B.md", "Yesterday"), ("C.png", "May")]);

    assert_eq!(rows[0].display_name, "A");
    assert_eq!(rows[0].preview_lines, vec!["Heading"]);
    assert_eq!(rows[0].date_text, "11:58");
    assert_eq!(rows[1].preview_lines, vec!["No additional text"]);
    assert_eq!(rows[2].preview_lines, vec!["Image file • 2.0 KB"]);
    assert_eq!(rows[2].date_text, "06/05/2024");
}

#[tokio::test]
async fn large_csv_is_summarized_without_a_read() {
    let host = MemHost::new();
    host.put(FileRecord::new("data.csv", 200 * 1024, ago(Duration::hours(1))), "a,b,c");
    let v = view(json!({ "showCSVFiles": true }));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["CSV file • 200.0 KB"]);
    assert_eq!(host.reads(), 0);
}

#[tokio::test]
async fn small_csv_shows_its_header_line() {
    let host = MemHost::new();
    host.put(FileRecord::new("data.csv", 20, ago(Duration::hours(1))), "id,name,score\n1,a,2");
    let v = view(json!({ "showCSVFiles": true }));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["CSV file • 20 B", "id,name,score"]);
}

#[tokio::test]
async fn large_markdown_gets_the_placeholder() {
    let host = MemHost::new();
    host.put(FileRecord::new("big.md", 150 * 1024, ago(Duration::hours(1))), "# big");
    let rows = view(json!({})).refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["File too large to preview"]);
    assert_eq!(host.reads(), 0);
}

#[tokio::test]
async fn unreadable_file_falls_back() {
    let host = MemHost::new();
    host.put(FileRecord::new("gone.md", 10, ago(Duration::hours(1))), "x");
    host.break_reads("gone.md");
    let rows = view(json!({})).refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["Could not read file"]);
}

#[tokio::test]
async fn previews_are_read_once_within_ttl() {
    let host = MemHost::new();
    host.put(FileRecord::new("a.md", 10, ago(Duration::hours(1))), "first");
    let v = view(json!({}));
    v.refresh(&host, &now()).await.unwrap();
    v.refresh(&host, &(now() + Duration::minutes(1))).await.unwrap();
    assert_eq!(host.reads(), 1);

    let later = now() + Duration::milliseconds(CACHE_TTL_MS);
    let rows = v.refresh(&host, &later).await.unwrap();
    assert_eq!(host.reads(), 2);
    assert_eq!(rows[0].preview_lines, vec!["first"]);
}

#[tokio::test]
async fn modify_notification_forces_a_fresh_read() {
    let host = MemHost::new();
    host.put(FileRecord::new("a.md", 10, ago(Duration::hours(1))), "before");
    let mut v = view(json!({}));
    v.refresh(&host, &now()).await.unwrap();

    host.modify("a.md", "after", now().timestamp_millis());
    let stale = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(stale[0].preview_lines, vec!["before"]);
    assert_eq!(host.reads(), 1);

    v.apply_changes(&batch(vec![ChangeEvent::modified("a.md")]));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["after"]);
    assert_eq!(host.reads(), 2);
}

#[tokio::test]
async fn preview_and_thumbnail_share_one_read() {
    let host = MemHost::new();
    host.put(FileRecord::new("img/cat.png", 10, ago(Duration::days(90))), "");
    host.put(FileRecord::new("note.md", 10, ago(Duration::hours(1))), "Intro line\n![[cat.png]]");
    let v = view(json!({ "showThumbnail": true, "showImageFiles": false }));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].thumbnail_url.as_deref(), Some("img/cat.png"));
    assert_eq!(rows[0].preview_lines, vec!["Intro line"]);
    assert_eq!(host.reads(), 1);

    v.refresh(&host, &now()).await.unwrap();
    assert_eq!(host.reads(), 1);
    assert_eq!(v.cached_thumbnails(), 1);
}

#[tokio::test]
async fn thumbnails_are_skipped_when_hidden() {
    let host = MemHost::new();
    host.put(FileRecord::new("pic.png", 10, ago(Duration::hours(1))), "");
    let v = view(json!({}));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].thumbnail_url, None);
    assert_eq!(v.cached_thumbnails(), 0);
}

#[tokio::test]
async fn pinned_rows_lead_and_follow_renames() {
    let host = MemHost::new();
    host.put(FileRecord::new("notes/old.md", 10, ago(Duration::days(100))), "pinned body");
    host.put(FileRecord::new("new.md", 10, ago(Duration::minutes(5))), "fresh");
    let mut v = view(json!({ "pinnedNotes": ["notes/old.md"], "showFolderName": true }));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].section, Section::Pinned);
    assert!(rows[0].pinned);
    assert_eq!(rows[0].folder.as_deref(), Some("notes"));
    assert_eq!(rows[1].folder, None);

    host.rename("notes/old.md", "notes/renamed.md");
    let changed = v.apply_changes(&batch(vec![ChangeEvent::Renamed {
        from: "notes/old.md".into(),
        to: "notes/renamed.md".into(),
    }]));
    assert!(changed);
    assert_eq!(v.settings().pinned_notes, vec!["notes/renamed.md"]);
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].file.path, "notes/renamed.md");
    assert_eq!(rows[0].section_label, "Pinned");
}

/// Starts a newer refresh generation from inside every content read.
struct Interrupting {
    inner: MemHost,
    gate: RefreshGate,
}

impl Host for Interrupting {
    fn files(&self) -> Vec<FileRecord> {
        self.inner.files()
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        self.gate.begin();
        self.inner.read_text(path).await
    }

    fn resolve_link(&self, target: &str, source: &str) -> Option<String> {
        self.inner.resolve_link(target, source)
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }

    fn open(&self, path: &str, target: OpenTarget) -> Result<()> {
        self.inner.open(path, target)
    }

    fn trash(&self, path: &str) -> Result<()> {
        self.inner.trash(path)
    }
}

#[tokio::test]
async fn superseded_pass_is_dropped_but_fills_the_cache() {
    let v = view(json!({}));
    let host = Interrupting {
        inner: MemHost::new(),
        gate: v.gate().clone(),
    };
    host.inner.put(FileRecord::new("a.md", 10, ago(Duration::hours(1))), "body");
    assert!(v.refresh(&host, &now()).await.is_none());
    assert_eq!(v.cached_previews(), 1);

    // everything is cached now, so no read interrupts the next pass
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["body"]);
    assert_eq!(host.inner.reads(), 1);
}

#[tokio::test]
async fn settings_change_clears_caches() {
    let host = MemHost::new();
    host.put(FileRecord::new("a.md", 10, ago(Duration::hours(1))), "one\ntwo\nthree");
    let mut v = view(json!({}));
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines.len(), 1);

    let mut s = v.settings().clone();
    s.apply("previewLines", "3").unwrap();
    v.update_settings(s);
    assert_eq!(v.cached_previews(), 0);
    let rows = v.refresh(&host, &now()).await.unwrap();
    assert_eq!(rows[0].preview_lines, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn sweep_evicts_expired_entries() {
    let host = MemHost::new();
    host.put(FileRecord::new("a.md", 10, ago(Duration::hours(1))), "x");
    let v = view(json!({}));
    v.refresh(&host, &now()).await.unwrap();
    assert_eq!(v.sweep(now().timestamp_millis()), 0);
    assert_eq!(v.sweep(now().timestamp_millis() + CACHE_TTL_MS), 1);
    assert_eq!(v.cached_previews(), 0);
}

#[tokio::test]
async fn commands_walk_the_displayed_order() {
    let host = MemHost::new();
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        host.put(FileRecord::new(format!("{name}.md"), 1, ago(Duration::minutes(i as i64))), "");
    }
    let v = view(json!({ "pageStepSize": 2, "pinnedNotes": ["d.md"] }));
    let rows = v.refresh(&host, &now()).await.unwrap();
    let order: Vec<&str> = rows.iter().map(|r| r.file.path.as_str()).collect();
    assert_eq!(order, vec!["d.md", "a.md", "b.md", "c.md"]);

    let run = |cmd, focused: Option<&str>, active: Option<&str>| {
        v.dispatch(&host, cmd, &rows, focused, active).unwrap()
    };
    assert_eq!(run(Command::Previous, Some("d.md"), None), None);
    assert_eq!(run(Command::Next, Some("c.md"), None).as_deref(), Some("d.md"));
    assert_eq!(run(Command::Next, None, Some("a.md")).as_deref(), Some("b.md"));
    assert_eq!(run(Command::Next, Some("b.md"), Some("a.md")).as_deref(), Some("c.md"));
    assert_eq!(run(Command::NextPage, Some("b.md"), None).as_deref(), Some("c.md"));
    assert_eq!(run(Command::PreviousPage, Some("c.md"), None).as_deref(), Some("a.md"));
    assert_eq!(run(Command::MoveToStart, Some("c.md"), None).as_deref(), Some("d.md"));
    assert_eq!(run(Command::OpenList, None, Some("b.md")).as_deref(), Some("b.md"));
    assert_eq!(run(Command::Previous, None, None).as_deref(), Some("c.md"));
    assert_eq!(host.opened().len(), 7);
    assert!(host.opened().iter().all(|(_, t)| *t == OpenTarget::Current));
}
