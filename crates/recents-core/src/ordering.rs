use crate::file::FileRecord;
use crate::filter::is_eligible;
use crate::settings::Settings;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::HashSet;

/// A file together with the timestamp it is sorted and bucketed by.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub file: FileRecord,
    pub effective_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedList {
    pub pinned: Vec<Ranked>,
    pub unpinned: Vec<Ranked>,
}

impl OrderedList {
    /// Pinned rows first, then unpinned.
    pub fn iter(&self) -> impl Iterator<Item = &Ranked> {
        self.pinned.iter().chain(self.unpinned.iter())
    }

    pub fn len(&self) -> usize {
        self.pinned.len() + self.unpinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Vec<String> {
        self.iter().map(|r| r.file.path.clone()).collect()
    }
}

pub fn build_ordered_list<I>(files: I, settings: &Settings) -> OrderedList
where
    I: IntoIterator<Item = FileRecord>,
{
    build_ordered_list_in(files, settings, &Local)
}

/// Filters, partitions by pin, sorts newest first and caps the unpinned
/// group. `tz` resolves front-matter dates that carry no offset.
pub fn build_ordered_list_in<I, Tz>(files: I, settings: &Settings, tz: &Tz) -> OrderedList
where
    I: IntoIterator<Item = FileRecord>,
    Tz: TimeZone,
{
    let mut seen = HashSet::new();
    let mut out = OrderedList::default();
    for file in files {
        if !is_eligible(&file, settings) || !seen.insert(file.path.clone()) {
            continue;
        }
        let effective_at = effective_timestamp_in(&file, settings, tz);
        let ranked = Ranked { file, effective_at };
        if settings.is_pinned(&ranked.file.path) {
            out.pinned.push(ranked);
        } else {
            out.unpinned.push(ranked);
        }
    }
    // stable: equal timestamps keep snapshot order
    out.pinned.sort_by_key(|r| Reverse(r.effective_at));
    out.unpinned.sort_by_key(|r| Reverse(r.effective_at));
    let room = settings.max_notes_to_show.saturating_sub(out.pinned.len());
    out.unpinned.truncate(room);
    out
}

pub fn effective_timestamp(file: &FileRecord, settings: &Settings) -> i64 {
    effective_timestamp_in(file, settings, &Local)
}

/// The configured front-matter date when it parses, else `modified_at`.
pub fn effective_timestamp_in<Tz: TimeZone>(
    file: &FileRecord,
    settings: &Settings,
    tz: &Tz,
) -> i64 {
    let key = settings.property_modified.trim();
    if key.is_empty() || !file.is_markdown() {
        return file.modified_at;
    }
    file.frontmatter_value(key)
        .and_then(|v| parse_date_value(v, tz))
        .unwrap_or(file.modified_at)
}

fn parse_date_value<Tz: TimeZone>(v: &Value, tz: &Tz) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_date_str(s.trim(), tz),
        _ => None,
    }
}

/// RFC 3339, `YYYY-MM-DD[ T]HH:MM[:SS]` in `tz`, or a bare `YYYY-MM-DD`
/// taken as midnight in `tz`.
pub fn parse_date_str<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    let naive = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}
