//! Inbound change notifications and the coalescing window that turns bursts
//! of them into one refresh.

use crate::file::FileRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChangeEvent {
    Modified { path: String },
    Created { path: String },
    Deleted { path: String },
    Renamed { from: String, to: String },
    ActiveChanged { path: Option<String> },
}

impl ChangeEvent {
    pub fn modified<S: Into<String>>(path: S) -> Self {
        Self::Modified { path: path.into() }
    }

    pub fn created<S: Into<String>>(path: S) -> Self {
        Self::Created { path: path.into() }
    }

    pub fn deleted<S: Into<String>>(path: S) -> Self {
        Self::Deleted { path: path.into() }
    }
}

/// Events gathered during one window, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    pub events: Vec<ChangeEvent>,
}

impl ChangeBatch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Collects events until `window` has passed since the first pending one.
#[derive(Debug)]
pub struct Coalescer {
    window: Duration,
    first_at: Option<Instant>,
    pending: Vec<ChangeEvent>,
}

impl Default for Coalescer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Coalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            first_at: None,
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, event: ChangeEvent, now: Instant) {
        self.first_at.get_or_insert(now);
        self.pending.push(event);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.first_at.map(|t| t + self.window)
    }

    /// The batch, once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ChangeBatch> {
        match self.deadline() {
            Some(d) if now >= d => self.flush(),
            _ => None,
        }
    }

    /// Whatever is pending, regardless of the window.
    pub fn flush(&mut self) -> Option<ChangeBatch> {
        self.first_at = None;
        if self.pending.is_empty() {
            return None;
        }
        Some(ChangeBatch {
            events: std::mem::take(&mut self.pending),
        })
    }
}

/// Forwards coalesced batches from `rx` to `tx` until `rx` closes; pending
/// events are flushed on close.
pub async fn coalesce_into(
    mut rx: mpsc::UnboundedReceiver<ChangeEvent>,
    window: Duration,
    tx: mpsc::UnboundedSender<ChangeBatch>,
) {
    let mut c = Coalescer::new(window);
    loop {
        let deadline = c.deadline();
        tokio::select! {
            ev = rx.recv() => match ev {
                Some(ev) => c.push(ev, Instant::now()),
                None => {
                    if let Some(batch) = c.flush() {
                        let _ = tx.send(batch);
                    }
                    return;
                }
            },
            _ = sleep_until(deadline) => {
                if let Some(batch) = c.poll(Instant::now()) {
                    tracing::debug!(events = batch.len(), "change batch ready");
                    if tx.send(batch).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d.into()).await,
        None => std::future::pending().await,
    }
}

/// Hands out refresh generations. A pass holding an older ticket than the
/// latest one must drop its result.
#[derive(Debug, Clone, Default)]
pub struct RefreshGate {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct RefreshTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RefreshTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RefreshTicket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

/// Events a polling host would have delivered between two snapshots.
/// Renames show up as a delete plus a create.
pub fn diff_snapshots(old: &[FileRecord], new: &[FileRecord]) -> Vec<ChangeEvent> {
    let before: HashMap<&str, &FileRecord> = old.iter().map(|f| (f.path.as_str(), f)).collect();
    let after: HashMap<&str, &FileRecord> = new.iter().map(|f| (f.path.as_str(), f)).collect();
    let mut out = Vec::new();
    for f in new {
        match before.get(f.path.as_str()) {
            None => out.push(ChangeEvent::created(&f.path)),
            Some(prev) if prev.modified_at != f.modified_at || prev.size != f.size => {
                out.push(ChangeEvent::modified(&f.path))
            }
            Some(_) => {}
        }
    }
    for f in old {
        if !after.contains_key(f.path.as_str()) {
            out.push(ChangeEvent::deleted(&f.path));
        }
    }
    out
}
