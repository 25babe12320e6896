//! Who is making the request.

use serde_json::{Map, Value};

use crate::server::RequestContext;

/// Resolves the current user for the `user` local.
///
/// Sessions and authentication live behind this trait; the server itself
/// only forwards whatever value it returns to the views.
pub trait Identity: Send + Sync {
    fn identify(&self, req: &RequestContext) -> Option<Value>;

    /// One-shot messages for the `flashes` local, keyed by kind
    /// (`{"error": ["..."]}`). Consumed by the session on read.
    fn flashes(&self, _req: &RequestContext) -> Value {
        Value::Object(Map::new())
    }
}

/// No one is ever signed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl Identity for Anonymous {
    fn identify(&self, _req: &RequestContext) -> Option<Value> {
        None
    }
}
