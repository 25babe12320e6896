//! HTTP server.
//!
//! # Request Flow
//!
//! ```text
//! request ─→ static file under public/? ──yes──→ file + Cache-Control
//!                    │ no
//!                    ▼
//!            RequestLog → CacheBuster → Locals ─→ [[pages]] route? ──yes──→ view
//!                                                        │ no
//!                                                        ▼
//!                                                    404 view
//! any error ─→ error view (500)
//! ```

mod context;
mod lifecycle;
pub mod middleware;
mod response;
mod router;

pub use context::{Body, Reply, RequestContext};
pub use lifecycle::setup_shutdown_handler;
pub use router::Router;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::Server;

use crate::asset::AssetStore;
use crate::config::SiteConfig;
use crate::utils::path::resolve_static;
use crate::view::{ERROR_VIEW, FileViews, NOT_FOUND_VIEW, ViewEngine};
use crate::{debug, log};
use middleware::{Anonymous, CacheBuster, Identity, Locals, Middleware, RequestLog, run_chain};

/// User agent of the sitemap crawler; its 404s are not logged.
pub const SITEMAP_AGENT: &str = "Node/SitemapGenerator";

// ============================================================================
// App
// ============================================================================

/// Request handling, independent of the socket.
pub struct App {
    public: PathBuf,
    static_max_age: u32,
    production: bool,
    views: Arc<dyn ViewEngine>,
    chain: Vec<Box<dyn Middleware>>,
    router: Router,
}

impl App {
    /// App with file views and anonymous users.
    pub fn new(config: &SiteConfig, store: AssetStore) -> Self {
        let views = FileViews::new(&config.server.views, config.server.production);
        Self::with_parts(config, store, Arc::new(Anonymous), Arc::new(views))
    }

    pub fn with_parts(
        config: &SiteConfig,
        store: AssetStore,
        identity: Arc<dyn Identity>,
        views: Arc<dyn ViewEngine>,
    ) -> Self {
        let production = config.server.production;
        let chain: Vec<Box<dyn Middleware>> = vec![
            Box::new(RequestLog),
            Box::new(CacheBuster::new(store)),
            Box::new(Locals::new(identity, production)),
        ];

        Self {
            public: config.server.public.clone(),
            static_max_age: config.server.static_max_age(),
            production,
            views,
            chain,
            router: Router::new(&config.pages),
        }
    }

    /// Produce the reply for one request.
    pub fn handle(&self, mut req: RequestContext) -> Reply {
        if req.is_read()
            && let Some(path) = resolve_static(&req.url, &self.public)
        {
            return Reply::file(path, self.static_max_age);
        }

        match self.dispatch(&mut req) {
            Ok(reply) => reply,
            Err(e) => self.error(&mut req, &e),
        }
    }

    fn dispatch(&self, req: &mut RequestContext) -> Result<Reply> {
        if let Some(reply) = run_chain(&self.chain, req)? {
            return Ok(reply);
        }

        if req.is_read()
            && let Some(view) = self.router.find(&req.path)
        {
            let html = self.views.render(view, &req.locals)?;
            return Ok(Reply::html(200, html));
        }

        self.not_found(req)
    }

    fn not_found(&self, req: &RequestContext) -> Result<Reply> {
        if !req.user_agent().contains(SITEMAP_AGENT) {
            log!("404"; "{} {} {}", req.method, req.url, req.client_ip());
        }
        let html = self.views.render(NOT_FOUND_VIEW, &req.locals)?;
        Ok(Reply::html(404, html))
    }

    fn error(&self, req: &mut RequestContext, err: &anyhow::Error) -> Reply {
        log!("error"; "{} {}: {:#}", req.method, req.url, err);

        req.locals.insert("status", 500);
        req.locals.insert("message", "Internal Server Error");
        if !self.production {
            req.locals.insert("error", format!("{err:#}"));
        }

        match self.views.render(ERROR_VIEW, &req.locals) {
            Ok(html) => Reply::html(500, html),
            Err(e) => {
                log!("error"; "error view failed: {}", e);
                Reply::text(500, "500 Internal Server Error")
            }
        }
    }
}

// ============================================================================
// Serving
// ============================================================================

/// Subscribe to asset changes, build the index, bind, and serve until
/// Ctrl+C.
pub fn serve(config: Arc<SiteConfig>) -> Result<()> {
    let background = lifecycle::prepare_assets(&config)?;

    let app = Arc::new(App::new(&config, background.store.clone()));
    let (server, addr) = lifecycle::bind_with_retry(config.server.interface, config.server.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server(Arc::clone(&server), shutdown_tx);

    let mode = if config.server.production { "production" } else { "development" };
    log!("serve"; "http://{} ({})", addr, mode);
    log!("serve"; "database {}", config.database.name());
    debug!(
        "serve"; "{} page route(s), views in {}",
        app.router.len(),
        config.server.views.display()
    );

    let background = lifecycle::spawn_background(background, shutdown_rx);

    run_request_loop(&server, &app, config.server.workers)?;
    lifecycle::wait_for_shutdown(background);
    Ok(())
}

fn run_request_loop(server: &Server, app: &Arc<App>, workers: usize) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to create request pool")?;

    for request in server.incoming_requests() {
        let app = Arc::clone(app);
        pool.spawn(move || {
            let reply = if lifecycle::is_shutdown() {
                response::unavailable()
            } else {
                app.handle(RequestContext::from_request(&request))
            };
            if let Err(e) = response::send(request, reply) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}
