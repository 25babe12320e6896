//! Per-request render context ("locals").

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::asset::AssetIndex;

/// Values handed to a view: named locals plus the asset index snapshot
/// under `hashes`.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    locals: Map<String, Value>,
    hashes: Option<Arc<AssetIndex>>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose an index snapshot as `hashes`.
    pub fn set_hashes(&mut self, hashes: Arc<AssetIndex>) {
        self.hashes = Some(hashes);
    }

    pub fn hashes(&self) -> Option<&AssetIndex> {
        self.hashes.as_deref()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.locals.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.locals.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.locals.contains_key(key)
    }

    /// Walk a dotted path through nested objects (`user.name`).
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut value = self.locals.get(first.as_ref())?;
        for seg in rest {
            value = match value {
                Value::Object(map) => map.get(seg.as_ref())?,
                Value::Array(items) => items.get(seg.as_ref().parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let mut ctx = RenderContext::new();
        ctx.insert("user", json!({ "name": "ada", "roles": ["admin"] }));
        ctx.insert("currentPath", "/about");

        assert_eq!(ctx.lookup(&["user", "name"]), Some(&json!("ada")));
        assert_eq!(ctx.lookup(&["user", "roles", "0"]), Some(&json!("admin")));
        assert_eq!(ctx.lookup(&["currentPath"]), Some(&json!("/about")));
        assert_eq!(ctx.lookup(&["user", "email"]), None);
        assert_eq!(ctx.lookup(&["currentPath", "x"]), None);
        assert_eq!(ctx.lookup::<&str>(&[]), None);
    }

    #[test]
    fn test_hashes_shared_snapshot() {
        let index: Arc<AssetIndex> = Arc::new(
            [("main.css".to_string(), "/css/main.css?v=1".to_string())]
                .into_iter()
                .collect(),
        );
        let mut ctx = RenderContext::new();
        assert!(ctx.hashes().is_none());

        ctx.set_hashes(Arc::clone(&index));
        assert_eq!(Arc::strong_count(&index), 2);
        assert_eq!(ctx.hashes().and_then(|h| h.get("main.css")), Some("/css/main.css?v=1"));
    }
}
