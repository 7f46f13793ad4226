//! Date text for rows: clock times, weekday names, relative days and a small
//! moment-style pattern language.

use crate::bucket::to_zoned;
use crate::i18n::Messages;
use crate::settings::Settings;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};

const DAY_MS: i64 = 86_400_000;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

// longest first per letter so `MMMM` wins over `MM`
const TOKENS: [&str; 22] = [
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "dddd", "ddd", "dd", "d", "DD", "D", "HH", "H", "hh",
    "h", "mm", "m", "ss", "s", "A", "a",
];

/// English month name for 1..=12.
pub fn month_name(month: u32) -> &'static str {
    MONTHS
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

fn weekday_name<D: Datelike>(d: &D) -> &'static str {
    WEEKDAYS[d.weekday().num_days_from_sunday() as usize]
}

fn weekday_short<D: Datelike>(d: &D) -> &'static str {
    &weekday_name(d)[..3]
}

/// Renders `pattern`; unknown characters pass through and `[...]` is literal.
pub fn format_pattern<Tz: TimeZone>(dt: &DateTime<Tz>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }
        if let Some(tok) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str(&render_token(dt, tok));
            rest = &rest[tok.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

fn render_token<Tz: TimeZone>(dt: &DateTime<Tz>, tok: &str) -> String {
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    match tok {
        "YYYY" => format!("{:04}", dt.year()),
        "YY" => format!("{:02}", dt.year().rem_euclid(100)),
        "MMMM" => month_name(dt.month()).to_string(),
        "MMM" => month_name(dt.month())[..3].to_string(),
        "MM" => format!("{:02}", dt.month()),
        "M" => dt.month().to_string(),
        "dddd" => weekday_name(dt).to_string(),
        "ddd" => weekday_short(dt).to_string(),
        "dd" => weekday_name(dt)[..2].to_string(),
        "d" => dt.weekday().num_days_from_sunday().to_string(),
        "DD" => format!("{:02}", dt.day()),
        "D" => dt.day().to_string(),
        "HH" => format!("{:02}", dt.hour()),
        "H" => dt.hour().to_string(),
        "hh" => format!("{hour12:02}"),
        "h" => hour12.to_string(),
        "mm" => format!("{:02}", dt.minute()),
        "m" => dt.minute().to_string(),
        "ss" => format!("{:02}", dt.second()),
        "s" => dt.second().to_string(),
        "A" => (if dt.hour() < 12 { "AM" } else { "PM" }).to_string(),
        "a" => (if dt.hour() < 12 { "am" } else { "pm" }).to_string(),
        _ => tok.to_string(),
    }
}

/// "today", "yesterday" or "N days ago" for a calendar-day distance.
pub fn relative_days(days: i64, msg: &Messages) -> String {
    match days {
        i64::MIN..=0 => msg.get("date.today").to_string(),
        1 => msg.get("date.yesterday").to_string(),
        n => msg.format("date.daysAgo", &[("n", &n.to_string())]),
    }
}

/// The date column of a row.
///
/// Today and yesterday always show the clock time. Within the last week the
/// weekday is shown unless dates are relative; older entries use the
/// configured pattern (or "N days ago" when relative).
pub fn date_text<Tz: TimeZone>(
    ts: i64,
    now: &DateTime<Tz>,
    settings: &Settings,
    msg: &Messages,
) -> String {
    if !settings.show_time {
        return String::new();
    }
    let dt = to_zoned(ts, &now.timezone());
    let days = (now.date_naive() - dt.date_naive()).num_days();
    if days == 0 || days == 1 {
        return format_pattern(&dt, "HH:mm");
    }
    if settings.is_relative_dates() {
        return relative_days(days, msg);
    }
    if ts > now.timestamp_millis() - 7 * DAY_MS {
        return weekday_name(&dt).to_string();
    }
    format_pattern(&dt, &settings.date_format)
}

/// Qualifier appended to daily-note names such as `2024-03-15`.
/// Only an exact `YYYY-MM-DD` that is a real calendar date qualifies.
pub fn daily_note_qualifier(basename: &str, today: NaiveDate, msg: &Messages) -> Option<String> {
    let b = basename.as_bytes();
    let shape_ok = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    let date = NaiveDate::parse_from_str(basename, "%Y-%m-%d").ok()?;
    let diff = (date - today).num_days();
    let short = weekday_short(&date);
    let q = match diff {
        0 => msg.get("date.today").to_string(),
        -1 => msg.get("date.yesterday").to_string(),
        1 => msg.get("date.tomorrow").to_string(),
        2..=7 => msg.format("date.next", &[("day", short)]),
        -7..=-2 => msg.format("date.last", &[("day", short)]),
        _ => short.to_string(),
    };
    Some(q)
}
