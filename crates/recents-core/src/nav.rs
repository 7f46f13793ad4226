//! Keyboard navigation over the displayed order (pinned rows first).
//!
//! Single steps wrap forward past the end but stop at the top; page steps
//! clamp at both ends.

use crate::file::FileRecord;
use crate::ordering::Ranked;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub trait HasPath {
    fn path(&self) -> &str;
}

impl HasPath for FileRecord {
    fn path(&self) -> &str {
        &self.path
    }
}

impl HasPath for Ranked {
    fn path(&self) -> &str {
        &self.file.path
    }
}

impl HasPath for String {
    fn path(&self) -> &str {
        self
    }
}

impl HasPath for &str {
    fn path(&self) -> &str {
        self
    }
}

/// The row navigation starts from: a focus-tracked row beats the host's
/// active file.
pub fn reference_path<'a>(focused: Option<&'a str>, active: Option<&'a str>) -> Option<&'a str> {
    focused.or(active)
}

pub fn position<T: HasPath>(list: &[T], current: Option<&str>) -> Option<usize> {
    let current = current?;
    list.iter().position(|item| item.path() == current)
}

fn fallback<T>(list: &[T], dir: Direction) -> Option<&T> {
    match dir {
        Direction::Up => list.last(),
        Direction::Down => list.first(),
    }
}

/// One row up or down. `None` when moving up from the first row.
pub fn adjacent<'a, T: HasPath>(
    list: &'a [T],
    current: Option<&str>,
    dir: Direction,
) -> Option<&'a T> {
    let Some(i) = position(list, current) else {
        return fallback(list, dir);
    };
    match dir {
        Direction::Up if i == 0 => None,
        Direction::Up => list.get(i - 1),
        Direction::Down => list.get((i + 1) % list.len()),
    }
}

/// `step` rows up or down, clamped to the list.
pub fn page<'a, T: HasPath>(
    list: &'a [T],
    current: Option<&str>,
    dir: Direction,
    step: usize,
) -> Option<&'a T> {
    let Some(i) = position(list, current) else {
        return fallback(list, dir);
    };
    let target = match dir {
        Direction::Up => i.saturating_sub(step),
        Direction::Down => i.saturating_add(step).min(list.len() - 1),
    };
    list.get(target)
}

pub fn start<T>(list: &[T]) -> Option<&T> {
    list.first()
}
