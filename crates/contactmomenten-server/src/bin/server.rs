//! Contact-moment server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `CONTACTMOMENTEN_*` environment variables over it, opens the SQLite store,
//! and serves the JSON API over HTTP.
//!
//! ```toml
//! host       = "0.0.0.0"
//! port       = 8000
//! base_url   = "http://localhost:8000/api/v1/"
//! store_path = "~/.local/share/contactmomenten.db"
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use contactmomenten_core::service::ContactMomentService;
use contactmomenten_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Contact-moment registration server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CONTACTMOMENTEN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = server_cfg
    .open_store()
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  let service = ContactMomentService::new(Arc::new(store), server_cfg.resolver());
  tracing::info!(base_url = %service.resolver().base(), "serving contact moments");

  let app = contactmomenten_server::router(Arc::new(service));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
