use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use recents_core::events::DEFAULT_WINDOW;
use recents_core::menu::{confirm_delete_prompt, toggle_pin};
use recents_core::settings::{Density, ThumbnailPosition};
use recents_core::{
    coalesce_into, delete_file, diff_snapshots, ChangeBatch, ChangeEvent, Command, DisplayRow, Host,
    OpenTarget, RecentView,
};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::config;
use crate::vault::VaultHost;

const RESCAN_EVERY: Duration = Duration::from_millis(1500);
const CONFIRM_WINDOW: Duration = Duration::from_millis(1500);
const HELP: &str = "↑/↓ move | PgUp/PgDn page | Home start | Enter open | o new tab | p pin \
                    | x delete | r refresh | Esc quit";

pub trait EventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

pub struct RealEventSource;

impl EventSource for RealEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

pub fn run_picker_default(
    rt: &Runtime,
    host: &VaultHost,
    view: &mut RecentView,
    vault: &Path,
) -> Result<()> {
    let mut es = RealEventSource;
    if let Some(path) = run_picker_with(rt, host, view, vault, &mut es, true)? {
        println!("{path}");
    }
    Ok(())
}

fn refresh(rt: &Runtime, host: &VaultHost, view: &RecentView, rows: &mut Vec<DisplayRow>) {
    if let Some(fresh) = rt.block_on(view.refresh(host, &Local::now())) {
        *rows = fresh;
    }
}

/// Keeps the focus on a listed row; falls back to the first one.
fn settle_focus(rows: &[DisplayRow], focused: &mut Option<String>) {
    let listed = focused
        .as_deref()
        .map(|p| rows.iter().any(|r| r.file.path == p))
        .unwrap_or(false);
    if !listed {
        *focused = rows.first().map(|r| r.file.path.clone());
    }
}

/// Runs the sidebar until Esc or an open. Returns the opened path.
pub fn run_picker_with(
    rt: &Runtime,
    host: &VaultHost,
    view: &mut RecentView,
    vault: &Path,
    es: &mut dyn EventSource,
    draw: bool,
) -> Result<Option<String>> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<ChangeEvent>();
    let (batch_tx, mut batch_rx) = mpsc::unbounded_channel::<ChangeBatch>();
    rt.spawn(coalesce_into(event_rx, DEFAULT_WINDOW, batch_tx));

    let mut rows = Vec::new();
    refresh(rt, host, view, &mut rows);
    let mut focused: Option<String> = None;
    settle_focus(&rows, &mut focused);
    let mut toast: Option<(String, Instant)> = None;
    let mut pending_delete: Option<(String, Instant)> = None;
    let mut last_scan = Instant::now();
    let mut opened: Option<String> = None;

    let mut terminal = if draw {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        Some(Terminal::new(CrosstermBackend::new(stdout))?)
    } else {
        None
    };

    loop {
        if let Some(ref mut term) = terminal {
            let toast_text = toast
                .as_ref()
                .filter(|(_, until)| Instant::now() <= *until)
                .map(|(m, _)| m.as_str());
            let view: &RecentView = view;
            term.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(3)])
                    .split(f.area());
                let (items, selected) = list_items(&rows, focused.as_deref(), view);
                let list = List::new(items)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(view.messages().get("view.title")),
                    )
                    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
                let mut state = ListState::default().with_selected(selected);
                f.render_stateful_widget(list, chunks[0], &mut state);

                let mut help = String::from(HELP);
                if let Some(msg) = toast_text {
                    help.push_str(&format!("  {msg}"));
                }
                let footer = Paragraph::new(help)
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: true });
                f.render_widget(footer, chunks[1]);
            })?;
        }

        if let Some(Event::Key(k)) = es.poll(Duration::from_millis(100))? {
            if k.kind == KeyEventKind::Press {
                let command = match k.code {
                    KeyCode::Up => Some(Command::Previous),
                    KeyCode::Down => Some(Command::Next),
                    KeyCode::PageUp => Some(Command::PreviousPage),
                    KeyCode::PageDown => Some(Command::NextPage),
                    KeyCode::Home => Some(Command::MoveToStart),
                    _ => None,
                };
                if let Some(command) = command {
                    let active = host.active_path();
                    let moved =
                        view.dispatch(host, command, &rows, focused.as_deref(), active.as_deref());
                    match moved {
                        Ok(Some(path)) => focused = Some(path),
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "navigation failed"),
                    }
                } else {
                    match k.code {
                        KeyCode::Esc | KeyCode::Char('q') => break,
                        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => break,
                        KeyCode::Enter | KeyCode::Char('o') => {
                            let target = if k.code == KeyCode::Enter {
                                OpenTarget::Current
                            } else {
                                OpenTarget::NewTab
                            };
                            if let Some(path) = focused.clone() {
                                match host.open(&path, target) {
                                    Ok(()) => {
                                        opened = Some(path);
                                        break;
                                    }
                                    Err(e) => {
                                        let until = Instant::now() + CONFIRM_WINDOW;
                                        toast = Some((e.to_string(), until));
                                    }
                                }
                            }
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            if let Some(path) = focused.clone() {
                                let pinned = toggle_pin(view.settings_mut(), &path);
                                config::save_settings(vault, view.settings())?;
                                let msg = if pinned { "menu.pin" } else { "menu.unpin" };
                                let until = Instant::now() + CONFIRM_WINDOW;
                                toast = Some((view.messages().get(msg).to_string(), until));
                                refresh(rt, host, view, &mut rows);
                            }
                        }
                        KeyCode::Delete | KeyCode::Char('x') | KeyCode::Char('X') => {
                            if let Some(path) = focused.clone() {
                                let now = Instant::now();
                                let confirmed = pending_delete
                                    .as_ref()
                                    .map(|(p, until)| *p == path && now <= *until)
                                    .unwrap_or(false);
                                if confirmed {
                                    pending_delete = None;
                                    if delete_file(host, &path)? {
                                        view.invalidate(&path);
                                        let done = view.messages().get("menu.delete");
                                        toast = Some((done.to_string(), now + CONFIRM_WINDOW));
                                    }
                                    refresh(rt, host, view, &mut rows);
                                    settle_focus(&rows, &mut focused);
                                } else {
                                    let name = rows
                                        .iter()
                                        .find(|r| r.file.path == path)
                                        .map(|r| r.display_name.clone())
                                        .unwrap_or_else(|| path.clone());
                                    let prompt = confirm_delete_prompt(&name, view.messages());
                                    toast = Some((prompt, now + CONFIRM_WINDOW));
                                    pending_delete = Some((path, now + CONFIRM_WINDOW));
                                }
                            }
                        }
                        KeyCode::Char('r') => {
                            host.rescan();
                            refresh(rt, host, view, &mut rows);
                            settle_focus(&rows, &mut focused);
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_scan.elapsed() >= RESCAN_EVERY {
            let before = host.files();
            let after = host.rescan();
            for change in diff_snapshots(&before, &after) {
                let _ = event_tx.send(change);
            }
            view.sweep(Local::now().timestamp_millis());
            last_scan = Instant::now();
        }
        let mut changed = false;
        while let Ok(batch) = batch_rx.try_recv() {
            if view.apply_changes(&batch) {
                config::save_settings(vault, view.settings())?;
            }
            changed = true;
        }
        if changed {
            refresh(rt, host, view, &mut rows);
            settle_focus(&rows, &mut focused);
        }
    }

    if draw {
        disable_raw_mode()?;
        crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    }
    Ok(opened)
}

/// List items with a header before each section, and the index of the
/// focused row among them.
fn list_items<'a>(
    rows: &'a [DisplayRow],
    focused: Option<&str>,
    view: &RecentView,
) -> (Vec<ListItem<'a>>, Option<usize>) {
    let settings = view.settings();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut items = Vec::new();
    let mut selected = None;
    let mut section = None;
    for r in rows {
        if section != Some(r.section) {
            section = Some(r.section);
            items.push(ListItem::new(Line::from(Span::styled(
                r.section_label.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ))));
        }
        if focused == Some(r.file.path.as_str()) {
            selected = Some(items.len());
        }
        let mut title = vec![Span::raw(format!("  {}", r.display_name))];
        if let Some(folder) = &r.folder {
            title.push(Span::styled(format!("  {folder}"), dim));
        }
        if r.thumbnail_url.is_some() {
            match settings.thumbnail_position {
                ThumbnailPosition::Left => title.insert(0, Span::raw("▣")),
                ThumbnailPosition::Right => title.push(Span::raw(" ▣")),
            }
        }
        let mut lines = vec![Line::from(title)];
        if settings.density == Density::Comfortable {
            if !r.date_text.is_empty() {
                lines.push(Line::from(Span::styled(format!("    {}", r.date_text), dim)));
            }
            lines.extend(
                r.preview_lines
                    .iter()
                    .map(|p| Line::from(Span::styled(format!("    {p}"), dim))),
            );
        } else if !r.date_text.is_empty() {
            lines[0].push_span(Span::styled(format!("  {}", r.date_text), dim));
        }
        items.push(ListItem::new(lines));
    }
    (items, selected)
}
