//! `[server]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [server]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8888                 # HTTP port number
//! production = false          # Long-lived static caching, hide error details
//! public = "public"           # Static file root
//! views = "views"             # View templates
//! workers = 4                 # Request worker threads
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One year, for digest-bearing static URLs in production.
pub const PRODUCTION_MAX_AGE: u32 = 31_536_000;
pub const DEVELOPMENT_MAX_AGE: u32 = 1;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Production mode.
    pub production: bool,

    /// Static file root, also the asset index root.
    pub public: PathBuf,

    /// Directory of `<name>.html` view templates.
    pub views: PathBuf,

    /// Request worker threads.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8888,
            production: false,
            public: "public".into(),
            views: "views".into(),
            workers: 4,
        }
    }
}

impl ServerConfig {
    /// `Cache-Control: max-age` for static responses.
    pub const fn static_max_age(&self) -> u32 {
        if self.production {
            PRODUCTION_MAX_AGE
        } else {
            DEVELOPMENT_MAX_AGE
        }
    }

    /// Origin the server answers on locally.
    pub fn local_url(&self) -> String {
        match self.interface {
            IpAddr::V6(ip) => format!("http://[{ip}]:{}", self.port),
            IpAddr::V4(ip) => format!("http://{ip}:{}", self.port),
        }
    }
}
