//! Per-request locals for views.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{Map, Value};

use super::{Device, Flow, Identity, Middleware};
use crate::server::RequestContext;

/// Fills `device`, `user`, `flashes`, `currentPath`, `query` and, in
/// production mode, `production`.
pub struct Locals {
    identity: Arc<dyn Identity>,
    production: bool,
}

impl Locals {
    pub fn new(identity: Arc<dyn Identity>, production: bool) -> Self {
        Self {
            identity,
            production,
        }
    }
}

impl Middleware for Locals {
    fn handle(&self, req: &mut RequestContext) -> Result<Flow> {
        let device = Device::classify(req.user_agent());
        let user = self.identity.identify(req).unwrap_or(Value::Null);
        let flashes = self.identity.flashes(req);
        let query: Map<String, Value> = req
            .query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let path = req.path.clone();

        let locals = &mut req.locals;
        locals.insert("device", device.as_str());
        locals.insert("user", user);
        locals.insert("flashes", flashes);
        locals.insert("currentPath", path);
        locals.insert("query", query);
        if self.production {
            locals.insert("production", true);
        }
        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::middleware::Anonymous;
    use serde_json::json;
    use tiny_http::Method;

    struct Fixed;

    impl Identity for Fixed {
        fn identify(&self, req: &RequestContext) -> Option<Value> {
            req.cookie("sid").map(|sid| json!({ "name": "ada", "sid": sid }))
        }

        fn flashes(&self, _req: &RequestContext) -> Value {
            json!({ "success": ["Saved"] })
        }
    }

    fn run(locals: &Locals, req: RequestContext) -> RequestContext {
        let mut req = req;
        locals.handle(&mut req).unwrap();
        req
    }

    #[test]
    fn test_development_locals() {
        let locals = Locals::new(Arc::new(Anonymous), false);
        let req = RequestContext::new(Method::Get, "/about?ref=home")
            .with_header("User-Agent", "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile/15E148");
        let req = run(&locals, req);

        assert_eq!(req.locals.get("device"), Some(&json!("phone")));
        assert_eq!(req.locals.get("user"), Some(&Value::Null));
        assert_eq!(req.locals.get("flashes"), Some(&json!({})));
        assert_eq!(req.locals.get("currentPath"), Some(&json!("/about")));
        assert_eq!(req.locals.lookup(&["query", "ref"]), Some(&json!("home")));
        assert!(!req.locals.contains("production"));
    }

    #[test]
    fn test_production_and_identity() {
        let locals = Locals::new(Arc::new(Fixed), true);
        let req = RequestContext::new(Method::Get, "/").with_header("Cookie", "sid=s1");
        let req = run(&locals, req);

        assert_eq!(req.locals.get("production"), Some(&json!(true)));
        assert_eq!(req.locals.lookup(&["user", "name"]), Some(&json!("ada")));
        assert_eq!(req.locals.get("device"), Some(&json!("desktop")));
        assert_eq!(req.locals.lookup(&["flashes", "success", "0"]), Some(&json!("Saved")));
    }
}
