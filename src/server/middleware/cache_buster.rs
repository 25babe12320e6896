//! Exposes the asset index to views.

use anyhow::Result;

use super::{Flow, Middleware};
use crate::asset::AssetStore;
use crate::server::RequestContext;

/// Puts the latest published index snapshot under `hashes`.
pub struct CacheBuster {
    store: AssetStore,
}

impl CacheBuster {
    pub fn new(store: AssetStore) -> Self {
        Self { store }
    }
}

impl Middleware for CacheBuster {
    fn handle(&self, req: &mut RequestContext) -> Result<Flow> {
        req.locals.set_hashes(self.store.load());
        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetIndex;
    use tiny_http::Method;

    fn index(url: &str) -> AssetIndex {
        [("main.css".to_string(), url.to_string())].into_iter().collect()
    }

    #[test]
    fn test_exposes_latest_index() {
        let store = AssetStore::new(index("/css/main.css?v=1"));
        let buster = CacheBuster::new(store.clone());

        let mut first = RequestContext::new(Method::Get, "/");
        buster.handle(&mut first).unwrap();

        store.publish(index("/css/main.css?v=2"));
        let mut second = RequestContext::new(Method::Get, "/");
        buster.handle(&mut second).unwrap();

        let url = |req: &RequestContext| {
            req.locals
                .hashes()
                .and_then(|h| h.get("main.css"))
                .map(str::to_string)
        };
        assert_eq!(url(&first).as_deref(), Some("/css/main.css?v=1"));
        assert_eq!(url(&second).as_deref(), Some("/css/main.css?v=2"));
    }
}
