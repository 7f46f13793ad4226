//! recents-core: view model for a sidebar of recently modified files.
//!
//! A refresh pass filters the host's file index, orders it newest first with
//! pinned files on top, groups rows into time sections and projects each one
//! into a [`DisplayRow`] with a date, preview lines and an optional thumbnail.

pub mod bucket;
pub mod cache;
pub mod datefmt;
pub mod error;
pub mod events;
pub mod file;
pub mod filter;
pub mod host;
pub mod i18n;
pub mod menu;
pub mod nav;
pub mod ordering;
pub mod preview;
pub mod settings;
pub mod thumbnail;
pub mod view;

pub use bucket::{group_sections, section_for, Section};
pub use error::{Error, Result};
pub use events::{coalesce_into, diff_snapshots, ChangeBatch, ChangeEvent, Coalescer, RefreshGate};
pub use file::{FileKind, FileRecord, Frontmatter};
pub use filter::is_eligible;
pub use host::{Host, MemHost, OpenTarget};
pub use i18n::Messages;
pub use menu::{delete_file, menu_entries, toggle_pin, MenuAction, MenuEntry};
pub use ordering::{build_ordered_list, OrderedList};
pub use settings::{controls, Settings};
pub use view::{Command, DisplayRow, RecentView};
