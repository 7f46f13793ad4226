use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use recents_core::settings::ControlKind;
use recents_core::view::runs;
use recents_core::{controls, delete_file, DisplayRow, Messages, RecentView};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod picker;
mod vault;

use vault::VaultHost;

#[derive(Parser)]
#[command(name = "recents", version, about = "Recently modified files of a notes vault")]
struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,
    /// Interface language (en, fr, de, es); defaults to $LANG
    #[arg(long, global = true)]
    locale: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the list once
    List {
        #[arg(long)]
        json: bool,
    },
    /// Interactive sidebar
    Pick,
    /// Keep a file at the top of the list
    Pin { path: String },
    Unpin { path: String },
    /// Move a file to the vault trash
    Delete { path: String },
    /// Show or edit settings
    Config {
        #[arg(long)]
        json: bool,
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Change one setting
    Set { key: String, value: String },
    /// Describe every setting
    Controls {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RECENTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let messages = Messages::for_locale(&cli.locale.clone().unwrap_or_else(config::env_locale));
    let vault = cli.vault;

    match cli.command {
        Commands::List { json } => {
            let host = VaultHost::load(&vault)?;
            let view = RecentView::new(config::load_settings(&vault), messages);
            let rows = runtime()?
                .block_on(view.refresh(&host, &Local::now()))
                .unwrap_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_rows(&rows);
            }
        }
        Commands::Pick => {
            let rt = runtime()?;
            let host = VaultHost::load(&vault)?;
            let mut view = RecentView::new(config::load_settings(&vault), messages);
            picker::run_picker_default(&rt, &host, &mut view, &vault)?;
        }
        Commands::Pin { path } => {
            let mut settings = config::load_settings(&vault);
            if !settings.is_pinned(&path) {
                settings.toggle_pin(&path);
                config::save_settings(&vault, &settings)?;
            }
            println!("pinned {path}");
        }
        Commands::Unpin { path } => {
            let mut settings = config::load_settings(&vault);
            if settings.is_pinned(&path) {
                settings.toggle_pin(&path);
                config::save_settings(&vault, &settings)?;
            }
            println!("unpinned {path}");
        }
        Commands::Delete { path } => {
            let host = VaultHost::load(&vault)?;
            if delete_file(&host, &path)? {
                println!("deleted {path}");
            } else {
                println!("skipped {path}: not found");
            }
        }
        Commands::Config { json, action: None } => {
            let settings = config::load_settings(&vault);
            if json {
                let v = json!({
                    "vault": vault.display().to_string(),
                    "settingsPath": config::settings_path(&vault).display().to_string(),
                    "trashDir": config::trash_dir(&vault).display().to_string(),
                    "settings": settings,
                });
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                println!("# {}", config::settings_path(&vault).display());
                for c in controls() {
                    let value = settings.value_text(c.key).unwrap_or_default();
                    println!("{} = {}", c.key, value.replace('\n', ", "));
                }
            }
        }
        Commands::Config {
            action: Some(ConfigAction::Set { key, value }),
            ..
        } => {
            let mut settings = config::load_settings(&vault);
            if let Err(e) = settings.apply(&key, &value) {
                tracing::warn!(key = %key, error = %e, "setting not changed");
                return Err(e.into());
            }
            config::save_settings(&vault, &settings)?;
            println!("{key} = {}", settings.value_text(&key).unwrap_or_default());
        }
        Commands::Config {
            action: Some(ConfigAction::Controls { json }),
            ..
        } => {
            let settings = config::load_settings(&vault);
            if json {
                let list: Vec<_> = controls()
                    .iter()
                    .map(|c| {
                        let mut v = json!({
                            "key": c.key,
                            "label": c.label,
                            "description": c.description,
                            "kind": kind_name(&c.kind),
                            "value": settings.value_text(c.key),
                        });
                        match c.kind {
                            ControlKind::Dropdown(options) => v["options"] = json!(options),
                            ControlKind::Slider { min, max } => {
                                v["min"] = json!(min);
                                v["max"] = json!(max);
                            }
                            _ => {}
                        }
                        v
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for c in controls() {
                    println!("{}\t{}\t{}", c.key, kind_name(&c.kind), c.label);
                }
            }
        }
    }

    Ok(())
}

fn kind_name(kind: &ControlKind) -> &'static str {
    match kind {
        ControlKind::Text => "text",
        ControlKind::Toggle => "toggle",
        ControlKind::Dropdown(_) => "dropdown",
        ControlKind::Slider { .. } => "slider",
        ControlKind::TextList => "textList",
    }
}

fn print_rows(rows: &[DisplayRow]) {
    for (label, run) in runs(rows) {
        println!("{label}");
        for r in run {
            let mut line = format!("  {}", r.display_name);
            if let Some(folder) = &r.folder {
                line.push_str(&format!(" [{folder}]"));
            }
            if !r.date_text.is_empty() {
                line.push_str(&format!("  {}", r.date_text));
            }
            println!("{line}");
            for p in &r.preview_lines {
                println!("    {p}");
            }
        }
    }
}
