//! `[database]` section configuration.
//!
//! ```toml
//! [database]
//! url = "mongodb://localhost:27017/site"
//! ```
//!
//! The URL is handed to the dump/restore tools unchanged. `DATABASE_URL`
//! overrides it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017/site".into(),
        }
    }
}

impl DatabaseConfig {
    /// Database name: last path segment of the URL, without query string.
    pub fn name(&self) -> &str {
        let without_query = self.url.split(['?', '#']).next().unwrap_or_default();
        let rest = without_query
            .split_once("://")
            .map_or(without_query, |(_, rest)| rest);
        let name = rest
            .split_once('/')
            .map(|(_, path)| path.trim_matches('/'))
            .unwrap_or_default();

        if name.is_empty() { "database" } else { name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(url: &str) -> DatabaseConfig {
        DatabaseConfig { url: url.into() }
    }

    #[test]
    fn test_name_from_url() {
        assert_eq!(db("mongodb://localhost:27017/site").name(), "site");
        assert_eq!(db("mongodb://u:p@host/blog?authSource=admin").name(), "blog");
        assert_eq!(db("mongodb+srv://cluster.example.net/shop/").name(), "shop");
    }

    #[test]
    fn test_name_without_database_segment() {
        assert_eq!(db("mongodb://localhost:27017").name(), "database");
        assert_eq!(db("mongodb://db.example.net").name(), "database");
        assert_eq!(db("").name(), "database");
    }
}
