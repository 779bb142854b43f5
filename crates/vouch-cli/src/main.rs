//! `vouch`: terminal UI for managing nominees and trustees.
//!
//! # Usage
//!
//! ```
//! vouch --database ~/vouch.db --storage-dir ~/vouch-storage
//! vouch --backend supabase --supabase-url https://abcd.supabase.co \
//!       --supabase-anon-key ... --email me@example.com --password secret
//! vouch --config ~/.config/vouch/config.toml
//! ```

mod app;
mod backend;
mod settings;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use backend::AnyBackend;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{BackendKind, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vouch_core::backend::Identity;
use vouch_store_sqlite::SqliteBackend;
use vouch_supabase::{SupabaseBackend, SupabaseConfig};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vouch", about = "Terminal UI for managing nominees and trustees")]
pub struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Which backend to use.
  #[arg(long, value_enum)]
  pub backend: Option<BackendKind>,

  /// SQLite database file for the local backend.
  #[arg(long, value_name = "FILE")]
  pub database: Option<PathBuf>,

  /// Directory holding uploads for the local backend.
  #[arg(long, value_name = "DIR")]
  pub storage_dir: Option<PathBuf>,

  /// Directory that exported lists are written to.
  #[arg(long, value_name = "DIR")]
  pub export_dir: Option<PathBuf>,

  /// Supabase project URL.
  #[arg(long, env = "VOUCH_SUPABASE_URL")]
  pub supabase_url: Option<String>,

  /// Supabase anon key.
  #[arg(long, env = "VOUCH_SUPABASE_ANON_KEY", hide_env_values = true)]
  pub supabase_anon_key: Option<String>,

  /// Account email for Supabase sign-in.
  #[arg(long, env = "VOUCH_EMAIL")]
  pub email: Option<String>,

  /// Account password for Supabase sign-in.
  #[arg(long, env = "VOUCH_PASSWORD", hide_env_values = true)]
  pub password: Option<String>,

  /// Where log output goes; the terminal belongs to the UI.
  #[arg(long, value_name = "FILE", default_value = "vouch.log")]
  pub log_file: PathBuf,
}

// ─── Setup ────────────────────────────────────────────────────────────────────

fn init_tracing(path: &Path) -> Result<()> {
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

/// Build the configured backend. Returns a status line to show on start,
/// e.g. when sign-in failed and the session is anonymous.
async fn open_backend(settings: &Settings) -> Result<(AnyBackend, Option<String>)> {
  match settings.backend {
    BackendKind::Local => {
      let user = Identity {
        id:    settings.local_user_id.unwrap_or(Uuid::nil()),
        email: settings.email.clone(),
      };
      let backend = SqliteBackend::open(&settings.database_path, &settings.storage_dir)
        .await
        .with_context(|| {
          format!("failed to open database at {}", settings.database_path.display())
        })?
        .with_user(user);
      tracing::info!(
        database = %settings.database_path.display(),
        storage = %backend.storage_root().display(),
        "opened local backend"
      );
      Ok((AnyBackend::Local(backend), None))
    }
    BackendKind::Supabase => {
      let url = settings
        .supabase_url
        .clone()
        .context("supabase_url is required for the supabase backend")?;
      let anon_key = settings
        .supabase_anon_key
        .clone()
        .context("supabase_anon_key is required for the supabase backend")?;
      let backend = SupabaseBackend::new(SupabaseConfig { url, anon_key })
        .context("failed to build HTTP client")?;

      let status = match (&settings.email, &settings.password) {
        (Some(email), Some(password)) => match backend.sign_in(email, password).await {
          Ok(_) => None,
          Err(e) => {
            tracing::warn!(error = %e, "sign-in failed");
            Some(format!("Sign-in failed: {e}"))
          }
        },
        _ => Some("Not signed in; set email and password to save changes".to_owned()),
      };
      Ok((AnyBackend::Supabase(backend), status))
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  init_tracing(&args.log_file)?;

  let settings = Settings::load(&args)?;
  let (backend, status) = open_backend(&settings).await?;
  tracing::info!(backend = backend.name(), "starting");

  let mut app = App::new(backend, settings.export_dir.clone());
  app.load_all().await;
  if let Some(status) = status {
    app.status_msg = status;
  }

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let term_backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(term_backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_uploads();
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
      if !app.handle_key(key).await? {
        break;
      }
    }
  }

  Ok(())
}
