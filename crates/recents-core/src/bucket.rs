use crate::i18n::Messages;
use crate::ordering::{OrderedList, Ranked};
use crate::datefmt::month_name;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

const DAY_MS: i64 = 86_400_000;

/// Header a row is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Section {
    Pinned,
    Today,
    Yesterday,
    Previous7Days,
    Previous30Days,
    /// Month number 1..=12 of the current year.
    Month(u32),
    Year(i32),
}

impl Section {
    pub fn label(&self, msg: &Messages) -> String {
        match self {
            Section::Pinned => msg.get("section.pinned").to_string(),
            Section::Today => msg.get("section.today").to_string(),
            Section::Yesterday => msg.get("section.yesterday").to_string(),
            Section::Previous7Days => msg.get("section.previous7").to_string(),
            Section::Previous30Days => msg.get("section.previous30").to_string(),
            Section::Month(m) => month_name(*m).to_string(),
            Section::Year(y) => format!("{y:04}"),
        }
    }
}

/// Converts epoch milliseconds into `tz`; out-of-range values clamp to the epoch.
pub fn to_zoned<Tz: TimeZone>(ts: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Bucket of a timestamp relative to `now`, using calendar days of `now`'s zone.
pub fn section_for<Tz: TimeZone>(ts: i64, now: &DateTime<Tz>) -> Section {
    let day = to_zoned(ts, &now.timezone()).date_naive();
    let today = now.date_naive();
    if day == today {
        return Section::Today;
    }
    if today.pred_opt() == Some(day) {
        return Section::Yesterday;
    }
    let now_ms = now.timestamp_millis();
    if ts > now_ms - 7 * DAY_MS {
        return Section::Previous7Days;
    }
    if ts > now_ms - 30 * DAY_MS {
        return Section::Previous30Days;
    }
    if day.year() == today.year() {
        Section::Month(day.month())
    } else {
        Section::Year(day.year())
    }
}

/// Splits an already sorted sequence into contiguous runs of equal section.
/// A new run starts only when the section differs from the previous item's.
pub fn group_runs<T, F>(
    items: impl IntoIterator<Item = T>,
    mut section_of: F,
) -> Vec<(Section, Vec<T>)>
where
    F: FnMut(&T) -> Section,
{
    let mut out: Vec<(Section, Vec<T>)> = Vec::new();
    for item in items {
        let section = section_of(&item);
        match out.last_mut() {
            Some((current, run)) if *current == section => run.push(item),
            _ => out.push((section, vec![item])),
        }
    }
    out
}

/// The leading `Pinned` group (when any) followed by the time buckets of the
/// unpinned rows. `now` is sampled once by the caller for the whole pass.
pub fn group_sections<'a, Tz: TimeZone>(
    list: &'a OrderedList,
    now: &DateTime<Tz>,
) -> Vec<(Section, Vec<&'a Ranked>)> {
    let mut out = Vec::new();
    if !list.pinned.is_empty() {
        out.push((Section::Pinned, list.pinned.iter().collect()));
    }
    out.extend(group_runs(list.unpinned.iter(), |r| {
        section_for(r.effective_at, now)
    }));
    out
}
