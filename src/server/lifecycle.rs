//! Server lifecycle: binding, shutdown, and the background runtime that
//! hosts the asset rebuild task and the daily jobs.

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use tiny_http::Server;
use tokio::sync::mpsc;

use crate::asset::watch::{AssetChange, AssetWatcher, CHANNEL_CAPACITY, Rebuilder};
use crate::asset::{self, AssetStore, IndexSpec};
use crate::config::SiteConfig;
use crate::jobs::{self, DailyAt, spawn_daily};
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for the background runtime
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

// =============================================================================
// Binding
// =============================================================================

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// =============================================================================
// Shutdown
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - Before `register_server()`: exits immediately
/// - After `register_server()`: unblocks the server and stops background tasks
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown.
pub fn register_server(server: Arc<Server>, shutdown_tx: Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

// =============================================================================
// Background runtime
// =============================================================================

/// Everything the background runtime owns.
pub struct Background {
    pub config: Arc<SiteConfig>,
    pub spec: Arc<IndexSpec>,
    pub store: AssetStore,
    /// Present when `[assets].watch` is on.
    pub changes: Option<(AssetWatcher, mpsc::Receiver<AssetChange>)>,
}

/// Subscribe to the asset folders (when watching), then build the initial
/// index.
///
/// Subscribing first means an edit made during the scan still reaches the
/// rebuild task.
pub fn prepare_assets(config: &Arc<SiteConfig>) -> Result<Background> {
    let spec = Arc::new(asset::index_spec(config)?);

    let changes = if config.assets.watch {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let watcher = AssetWatcher::start(&spec.folder_paths(), tx)?;
        Some((watcher, rx))
    } else {
        None
    };
    let store = asset::init_store(&spec)?;

    Ok(Background {
        config: Arc::clone(config),
        spec,
        store,
        changes,
    })
}

/// Run the rebuild task and scheduled jobs on their own thread until
/// `shutdown_rx` fires.
pub fn spawn_background(background: Background, shutdown_rx: Receiver<()>) -> JoinHandle<()> {
    thread::spawn(move || run_background(background, shutdown_rx))
}

fn run_background(background: Background, shutdown_rx: Receiver<()>) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("error"; "failed to start background runtime: {}", e);
            return;
        }
    };

    rt.block_on(async move {
        let Background {
            config,
            spec,
            store,
            changes,
        } = background;

        // Dropping the watcher ends the subscription, so it lives until shutdown
        let _watcher = changes.map(|(watcher, events)| {
            tokio::spawn(Rebuilder::new(spec, store, events).run());
            watcher
        });

        schedule_jobs(&config);

        let _ = tokio::task::spawn_blocking(move || shutdown_rx.recv()).await;
    });

    // A running dump may outlive shutdown; don't wait on it
    rt.shutdown_timeout(Duration::from_secs(1));
}

/// Startup sitemap run plus the daily sitemap and backup schedules.
fn schedule_jobs(config: &Arc<SiteConfig>) {
    if config.sitemap.enable
        && let Some(at) = DailyAt::parse(&config.sitemap.at)
    {
        let cfg = Arc::clone(config);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = jobs::build_sitemap(&cfg, false) {
                log!("sitemap"; "{:#}", anyhow::Error::from(e));
            }
        });

        let cfg = Arc::clone(config);
        spawn_daily("sitemap", at, move || {
            jobs::build_sitemap(&cfg, false)?;
            Ok(())
        });
        log!("schedule"; "sitemap daily at {}", at);
    }

    if config.backup.enable
        && let Some(at) = DailyAt::parse(&config.backup.at)
    {
        let cfg = Arc::clone(config);
        spawn_daily("backup", at, move || {
            jobs::backup_now(&cfg)?;
            Ok(())
        });
        log!("schedule"; "backup daily at {} -> {}", at, config.backup.dir.display());
    }
}

/// Wait for the background thread to finish (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
