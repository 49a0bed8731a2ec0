use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{FileConfig, Overrides, ServiceConfig, StoreKind};
use crate::forms::{build_service, routes};
use crate::logging::{init_logging, LogConfig};
use crate::middleware::CorsMiddleware;
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use crate::server::{HttpServer, ServerHandle};
use crate::storage::{FormStore, MemoryFormStore, MongoFormStore, PooledStore};

/// Command-line interface for the form-builder service
#[derive(Parser, Debug)]
#[command(name = "form-builder", version)]
#[command(about = "CRUD API for form definitions", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the route table and exit
    Routes,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeArgs {
    /// YAML config file; flags and environment take precedence over it
    #[arg(short, long, value_name = "FILE", env = "FORMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(long, env = "MONGO_URL", hide_env_values = true)]
    pub mongo_url: Option<String>,

    /// Database name [default: FORM_BUILDER]
    #[arg(long, env = "FORMS_DATABASE")]
    pub database: Option<String>,

    /// Interface to bind [default: 0.0.0.0]
    #[arg(long, env = "FORMS_HOST")]
    pub host: Option<String>,

    /// Port to bind [default: 8080]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Storage backend [default: mongo]
    #[arg(long, value_enum, env = "FORMS_STORE")]
    pub store: Option<StoreKind>,
}

impl ServeArgs {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            mongo_url: self.mongo_url.clone(),
            database: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            store: self.store,
        }
    }

    /// Merge these flags with the config file they name, if any.
    ///
    /// # Errors
    ///
    /// Fails when the config file cannot be read or parsed.
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(ServiceConfig::resolve(self.overrides(), file))
    }
}

/// Parse arguments and run the selected command.
///
/// # Errors
///
/// Returns an error if logging cannot be initialised, the config file is
/// invalid, or the listen address cannot be bound.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve(cli.serve)) {
        Commands::Routes => {
            Router::new(routes())
                .context("Failed to compile route table")?
                .dump_routes();
            println!("[route] GET /health -> health");
            Ok(())
        }
        Commands::Serve(args) => serve(&args),
    }
}

fn serve(args: &ServeArgs) -> Result<()> {
    let _log_guard = init_logging(&LogConfig::from_env())?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();
    info!(
        stack_size = runtime.stack_size,
        workers = runtime.workers,
        store_threads = runtime.store_threads,
        "Coroutine runtime configured"
    );

    let config = args.resolve()?;
    let store = open_store(&config, runtime.store_threads)?;
    let service =
        build_service(store, CorsMiddleware::default()).context("Failed to compile route table")?;

    let addr = config.bind_addr();
    let handle = HttpServer(service)
        .start(addr.as_str())
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, store = ?config.store, "Server started");

    wait_for_shutdown(handle)
}

/// Build the configured store. A Mongo store without a connection string is
/// started unavailable so the API still answers (with 500s).
///
/// Mongo calls block, so the Mongo store runs behind a [`PooledStore`] with
/// `store_threads` threads.
///
/// # Errors
///
/// Fails when the store threads cannot be spawned.
pub fn open_store(config: &ServiceConfig, store_threads: usize) -> Result<Arc<dyn FormStore>> {
    let mongo = match config.store {
        StoreKind::Memory => {
            warn!("Using in-memory store; forms are lost on exit");
            return Ok(Arc::new(MemoryFormStore::new()));
        }
        StoreKind::Mongo => match &config.mongo_url {
            Some(url) => MongoFormStore::connect(url, &config.database),
            None => {
                error!("MongoDB connection error: MONGO_URL is not set");
                MongoFormStore::unavailable("no MongoDB connection string configured")
            }
        },
    };
    let pooled = PooledStore::new(Arc::new(mongo), store_threads)
        .context("Failed to start store threads")?;
    Ok(Arc::new(pooled))
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("Server coroutine panicked: {e:?}"))
}
