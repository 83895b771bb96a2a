//! `taskdesk` — terminal client for the task-tracking service.
//!
//! # Usage
//!
//! ```
//! taskdesk --url http://localhost:8080 --email ana@example.com --password secret
//! taskdesk --config ~/.config/taskdesk/config.toml
//! ```
//!
//! Logs go to a file (stdout belongs to the UI); set `RUST_LOG` to change
//! the level.

mod app;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use taskdesk_client::{ApiClient, Gateway, Session};
use taskdesk_core::page::DEFAULT_PAGE_SIZE;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about = "Terminal client for the task tracker")]
struct Args {
  /// Path to a TOML config file (url, email, password, page_size).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: http://localhost:8080).
  #[arg(long, env = "TASKDESK_URL")]
  url: Option<String>,

  /// Account email. With a password, signs in at startup.
  #[arg(long, env = "TASKDESK_EMAIL")]
  email: Option<String>,

  #[arg(long, env = "TASKDESK_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  /// Rows per page in list views.
  #[arg(long)]
  page_size: Option<u32>,

  /// Where to write logs (default: taskdesk.log in the temp directory).
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  email:     String,
  #[serde(default)]
  password:  String,
  page_size: Option<u32>,
}

/// Effective settings after layering flags over the file over defaults.
struct Settings {
  url:       String,
  email:     String,
  password:  String,
  page_size: u32,
}

impl Settings {
  fn resolve(args: Args, file: ConfigFile) -> Self {
    let pick = |flag: Option<String>, from_file: String| {
      flag.or_else(|| (!from_file.is_empty()).then_some(from_file))
    };
    Self {
      url:       pick(args.url, file.url).unwrap_or_else(|| DEFAULT_URL.to_owned()),
      email:     pick(args.email, file.email).unwrap_or_default(),
      password:  pick(args.password, file.password).unwrap_or_default(),
      page_size: args.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE).max(1),
    }
  }
}

fn init_tracing(path: PathBuf) -> Result<()> {
  let file = File::create(&path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Arc::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let log_path = args
    .log_file
    .clone()
    .unwrap_or_else(|| std::env::temp_dir().join("taskdesk.log"));
  init_tracing(log_path)?;

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };
  let settings = Settings::resolve(args, file_cfg);
  tracing::info!(url = %settings.url, "starting");

  let session = Arc::new(Session::new());
  let gateway = Gateway::new(&settings.url, Arc::clone(&session)).context("building HTTP client")?;
  let mut app = App::new(ApiClient::new(gateway), Arc::clone(&session));
  app.page_size = settings.page_size;
  app.login.email = settings.email;
  app.login.password = settings.password;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  if !app.login.email.is_empty() && !app.login.password.is_empty() {
    app.login().await;
  }

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, &session).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  session: &Session,
) -> Result<()> {
  let mut logout = session.subscribe_logout();

  loop {
    // Logout can come from a key press or from any call that hit 401.
    loop {
      match logout.try_recv() {
        Ok(reason) => app.on_logout(reason),
        Err(TryRecvError::Lagged(_)) => continue,
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }
    app.tick();

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind == KeyEventKind::Press && !app.handle_key(key).await? {
        break;
      }
    }
  }

  Ok(())
}
