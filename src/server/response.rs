//! Sending replies through tiny_http.

use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use tiny_http::{Header, Request, Response, StatusCode};

use super::context::{Body, Reply};

/// Bodies smaller than this are sent uncompressed.
const GZIP_MIN_BYTES: usize = 1024;

/// Send `reply`, gzipped when the client accepts it. HEAD requests get the
/// headers without a body.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let head = request.method() == &tiny_http::Method::Head;
    let accept = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Accept-Encoding"))
        .map(|h| h.value.as_str().to_string());
    let reply = negotiate(reply, accept.as_deref())?;

    let headers: Vec<Header> = reply
        .headers
        .iter()
        .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
        .collect();
    let status = StatusCode(reply.status);

    match reply.body {
        _ if head => {
            let mut response = Response::empty(status);
            for header in headers {
                response.add_header(header);
            }
            request.respond(response)?;
        }
        Body::Bytes(bytes) => {
            let mut response = Response::from_data(bytes).with_status_code(status);
            for header in headers {
                response.add_header(header);
            }
            request.respond(response)?;
        }
        Body::File(path) => {
            let file = fs::File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let mut response = Response::from_file(file).with_status_code(status);
            for header in headers {
                response.add_header(header);
            }
            request.respond(response)?;
        }
    }
    Ok(())
}

/// Plain 503 while shutting down.
pub fn unavailable() -> Reply {
    Reply::text(503, "503 Service Unavailable")
}

// ============================================================================
// Compression
// ============================================================================

/// Gzip text replies (HTML, CSS, JS, JSON, XML, SVG) for clients whose
/// `Accept-Encoding` allows it.
///
/// Compressible replies always carry `Vary: Accept-Encoding`. File bodies
/// are read into memory when compressed.
pub fn negotiate(mut reply: Reply, accept_encoding: Option<&str>) -> Result<Reply> {
    if !reply.header("Content-Type").is_some_and(is_compressible)
        || reply.header("Content-Encoding").is_some()
    {
        return Ok(reply);
    }
    reply.headers.push(("Vary", "Accept-Encoding".into()));

    if !accept_encoding.is_some_and(accepts_gzip) {
        return Ok(reply);
    }

    let bytes = match &reply.body {
        Body::Bytes(bytes) if bytes.len() >= GZIP_MIN_BYTES => gzip(bytes)?,
        Body::Bytes(_) => return Ok(reply),
        Body::File(path) => {
            let data =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            if data.len() < GZIP_MIN_BYTES {
                reply.body = Body::Bytes(data);
                return Ok(reply);
            }
            gzip(&data)?
        }
    };

    reply.body = Body::Bytes(bytes);
    reply.headers.push(("Content-Encoding", "gzip".into()));
    Ok(reply)
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn is_compressible(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/")
        || mime.ends_with("javascript")
        || mime.ends_with("json")
        || mime.ends_with("xml")
}

/// `gzip` or `*` listed without `q=0`.
fn accepts_gzip(header: &str) -> bool {
    header.split(',').any(|part| {
        let mut params = part.split(';').map(str::trim);
        let coding = params.next().unwrap_or_default();
        let refused = params.any(|p| {
            p.strip_prefix("q=")
                .and_then(|q| q.parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        });
        (coding.eq_ignore_ascii_case("gzip") || coding == "*") && !refused
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn page() -> String {
        "<p>hello</p>".repeat(200)
    }

    fn gunzip(reply: &Reply) -> String {
        let Body::Bytes(bytes) = &reply.body else {
            panic!("expected bytes body");
        };
        let mut out = String::new();
        GzDecoder::new(bytes.as_slice()).read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_html_gzipped_when_accepted() {
        let reply = negotiate(Reply::html(200, page()), Some("gzip, deflate, br")).unwrap();

        assert_eq!(reply.header("Content-Encoding"), Some("gzip"));
        assert_eq!(reply.header("Vary"), Some("Accept-Encoding"));
        assert_eq!(gunzip(&reply), page());
    }

    #[test]
    fn test_not_gzipped_without_accept() {
        for accept in [None, Some("identity"), Some("gzip;q=0, br")] {
            let reply = negotiate(Reply::html(200, page()), accept).unwrap();
            assert_eq!(reply.header("Content-Encoding"), None, "{accept:?}");
            assert_eq!(reply.text_body(), page());
        }
    }

    #[test]
    fn test_small_and_binary_bodies_untouched() {
        let reply = negotiate(Reply::html(200, "<p>hi</p>".into()), Some("gzip")).unwrap();
        assert_eq!(reply.header("Content-Encoding"), None);
        assert_eq!(reply.header("Vary"), Some("Accept-Encoding"));

        let png = Reply::file(PathBuf::from("/srv/public/logo.png"), 1);
        let reply = negotiate(png, Some("gzip")).unwrap();
        assert_eq!(reply.header("Content-Encoding"), None);
        assert_eq!(reply.header("Vary"), None);
        assert!(matches!(reply.body, Body::File(_)));
    }

    #[test]
    fn test_static_css_file_gzipped() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("main.css");
        let source = "body{margin:0}\n".repeat(100);
        fs::write(&css, &source).unwrap();

        let reply = negotiate(Reply::file(css, 31536000), Some("*")).unwrap();

        assert_eq!(reply.header("Content-Encoding"), Some("gzip"));
        assert_eq!(reply.header("Cache-Control"), Some("public, max-age=31536000"));
        assert_eq!(gunzip(&reply), source);
    }

    #[test]
    fn test_accepts_gzip() {
        assert!(accepts_gzip("gzip"));
        assert!(accepts_gzip("br, GZIP;q=0.5"));
        assert!(accepts_gzip("*"));
        assert!(!accepts_gzip("br, deflate"));
        assert!(!accepts_gzip("gzip;q=0"));
        assert!(!accepts_gzip("x-gzip-like"));
    }
}
