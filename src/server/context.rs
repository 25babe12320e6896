//! Request and reply values passed through the middleware chain.
//!
//! Decoupled from `tiny_http` so handling can be exercised directly.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use tiny_http::Method;

use crate::utils::mime::types;
use crate::view::RenderContext;

// ============================================================================
// RequestContext
// ============================================================================

/// One HTTP request plus its render locals.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Raw request target, e.g. `/about?ref=home`.
    pub url: String,
    /// Decoded path without query string.
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub remote: Option<SocketAddr>,
    pub locals: RenderContext,
    headers: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        let (raw_path, raw_query) = url.split_once('?').unwrap_or((url.as_str(), ""));
        let raw_path = raw_path.split('#').next().unwrap_or_default();

        let path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();
        let query = url::form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();

        Self {
            method,
            path: if path.is_empty() { "/".into() } else { path },
            query,
            url,
            remote: None,
            locals: RenderContext::new(),
            headers: Vec::new(),
        }
    }

    /// Capture method, URL, headers and peer address from a live request.
    pub fn from_request(request: &tiny_http::Request) -> Self {
        let mut ctx = Self::new(request.method().clone(), request.url());
        ctx.remote = request.remote_addr().copied();
        ctx.headers = request
            .headers()
            .iter()
            .map(|h| (h.field.as_str().as_str().to_string(), h.value.as_str().to_string()))
            .collect();
        ctx
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_remote(mut self, remote: SocketAddr) -> Self {
        self.remote = Some(remote);
        self
    }

    /// First header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn user_agent(&self) -> &str {
        self.header("User-Agent").unwrap_or_default()
    }

    /// Value of cookie `name` from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("Cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim_matches('"'))
    }

    /// Client address, preferring the first `X-Forwarded-For` hop.
    pub fn client_ip(&self) -> String {
        self.header("X-Forwarded-For")
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .or_else(|| self.remote.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "-".into())
    }

    pub fn is_read(&self) -> bool {
        matches!(self.method, Method::Get | Method::Head)
    }
}

// ============================================================================
// Reply
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Bytes(Vec<u8>),
    /// Streamed from disk when sent.
    File(PathBuf),
}

/// Status, headers and body of a response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Body,
}

impl Reply {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body: Body::Bytes(body.into()),
        }
    }

    pub fn html(status: u16, body: String) -> Self {
        Self::new(status, types::HTML, body)
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, types::PLAIN, body)
    }

    /// A static file with `Cache-Control: public, max-age=<max_age>`.
    pub fn file(path: PathBuf, max_age: u32) -> Self {
        let content_type = crate::utils::mime::from_path(&path);
        Self {
            status: 200,
            headers: vec![
                ("Content-Type", content_type.to_string()),
                ("Cache-Control", format!("public, max-age={max_age}")),
            ],
            body: Body::File(path),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text (empty for file bodies).
    pub fn text_body(&self) -> std::borrow::Cow<'_, str> {
        match &self.body {
            Body::Bytes(bytes) => String::from_utf8_lossy(bytes),
            Body::File(_) => std::borrow::Cow::Borrowed(""),
        }
    }
}
