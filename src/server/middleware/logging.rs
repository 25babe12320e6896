//! Request logging.

use anyhow::Result;

use super::{Flow, Middleware};
use crate::log;
use crate::logger::now;
use crate::server::RequestContext;

/// Logs every request that reaches the middleware chain (static files are
/// answered before it).
pub struct RequestLog;

impl RequestLog {
    pub fn line(req: &RequestContext) -> String {
        format!("{} {} {} {}", now(), req.method, req.url, req.client_ip())
    }
}

impl Middleware for RequestLog {
    fn handle(&self, req: &mut RequestContext) -> Result<Flow> {
        log!("request"; "{}", Self::line(req));
        Ok(Flow::Next)
    }
}
