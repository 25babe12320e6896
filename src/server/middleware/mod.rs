//! Request middleware.
//!
//! Each middleware sees the request before the router and may fill locals
//! or answer directly.
//!
//! | Middleware    | Effect                                                  |
//! |---------------|---------------------------------------------------------|
//! | `RequestLog`  | logs time, method, path and client IP                   |
//! | `CacheBuster` | exposes the current asset index as `hashes`             |
//! | `Locals`      | `device`, `user`, `currentPath`, `query`, `production`  |

mod cache_buster;
mod device;
mod identity;
mod locals;
mod logging;

pub use cache_buster::CacheBuster;
pub use device::Device;
pub use identity::{Anonymous, Identity};
pub use locals::Locals;
pub use logging::RequestLog;

use anyhow::Result;

use super::{Reply, RequestContext};

/// Outcome of one middleware step.
#[derive(Debug)]
pub enum Flow {
    /// Continue with the next handler.
    Next,
    /// Stop and send this reply.
    Reply(Reply),
}

pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut RequestContext) -> Result<Flow>;
}

/// Run `chain` in order until one answers.
pub fn run_chain(chain: &[Box<dyn Middleware>], req: &mut RequestContext) -> Result<Option<Reply>> {
    for middleware in chain {
        if let Flow::Reply(reply) = middleware.handle(req)? {
            return Ok(Some(reply));
        }
    }
    Ok(None)
}
