mod api;
mod app;
mod cache;
mod config;
mod dataset;
mod error;
mod event;
mod loader;
mod logging;
mod products;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::HttpProductSource;
use crate::cache::{ProductStore, SqliteProductStore, UnavailableStore};
use crate::loader::ProductLoader;

#[derive(Parser, Debug)]
#[command(name = "wares")]
#[command(about = "Browse the product catalogue, with an offline cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/wares/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Product API base URL
  #[arg(long)]
  base_url: Option<String>,

  /// Run without the local product cache
  #[arg(long)]
  no_cache: bool,

  /// Show the built-in demo products until the first load completes
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if args.no_cache {
    config.cache.enabled = false;
  }

  let _log_guard = logging::init(&config)?;

  let source = HttpProductSource::new(&config)?;
  info!(url = %source.url(), "starting");

  let loader = ProductLoader::new(Arc::new(source), open_store(&config));

  if args.seed {
    loader
      .import_product_data(&dataset::demo_rows())
      .map_err(|e| eyre!("Failed to import demo products: {}", e))?;
  }

  let mut app = app::App::new(config, loader);
  app.run().await?;

  Ok(())
}

/// Open the product cache, degrading to no cache when it cannot be opened.
fn open_store(config: &config::Config) -> Arc<dyn ProductStore> {
  if !config.cache.enabled {
    info!("product cache disabled");
    return Arc::new(UnavailableStore);
  }

  let opened = config
    .cache_path()
    .and_then(|path| SqliteProductStore::open(&path).map_err(|e| eyre!("{}: {}", path.display(), e)));

  match opened {
    Ok(store) => Arc::new(store),
    Err(e) => {
      warn!(error = %e, "product cache unavailable");
      Arc::new(UnavailableStore)
    }
  }
}
