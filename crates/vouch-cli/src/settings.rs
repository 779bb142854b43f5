//! Layered configuration: defaults, then an optional TOML file, then
//! `VOUCH_*` environment variables, then command-line flags.

use std::path::PathBuf;

use anyhow::Context as _;
use serde::Deserialize;
use uuid::Uuid;

use crate::Args;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
  /// SQLite file plus a storage directory on this machine.
  #[default]
  Local,
  /// A hosted Supabase project.
  Supabase,
}

impl BackendKind {
  fn as_str(self) -> &'static str {
    match self {
      Self::Local => "local",
      Self::Supabase => "supabase",
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub backend:           BackendKind,
  #[serde(default = "default_database_path")]
  pub database_path:     PathBuf,
  #[serde(default = "default_storage_dir")]
  pub storage_dir:       PathBuf,
  /// Owner stamped on local rows; the nil UUID when unset.
  #[serde(default)]
  pub local_user_id:     Option<Uuid>,
  #[serde(default)]
  pub supabase_url:      Option<String>,
  #[serde(default)]
  pub supabase_anon_key: Option<String>,
  #[serde(default)]
  pub email:             Option<String>,
  #[serde(default)]
  pub password:          Option<String>,
  #[serde(default = "default_export_dir")]
  pub export_dir:        PathBuf,
}

fn default_database_path() -> PathBuf { PathBuf::from("vouch.db") }

fn default_storage_dir() -> PathBuf { PathBuf::from("vouch-storage") }

fn default_export_dir() -> PathBuf { PathBuf::from(".") }

fn path_string(path: &Option<PathBuf>) -> Option<String> {
  path.as_ref().map(|p| p.display().to_string())
}

impl Settings {
  pub fn load(args: &Args) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = &args.config {
      builder = builder.add_source(config::File::from(path.clone()).required(true));
    }

    // CLI flags override the file and environment.
    let settings = builder
      .add_source(config::Environment::with_prefix("VOUCH"))
      .set_override_option("backend", args.backend.map(BackendKind::as_str))?
      .set_override_option("database_path", path_string(&args.database))?
      .set_override_option("storage_dir", path_string(&args.storage_dir))?
      .set_override_option("export_dir", path_string(&args.export_dir))?
      .set_override_option("supabase_url", args.supabase_url.clone())?
      .set_override_option("supabase_anon_key", args.supabase_anon_key.clone())?
      .set_override_option("email", args.email.clone())?
      .set_override_option("password", args.password.clone())?
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }
}
