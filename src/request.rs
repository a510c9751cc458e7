//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Uri};

use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self { method, uri, headers, body }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup. Case-insensitive; non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Media type of the body without parameters, lowercased
    /// (`"application/json; charset=utf-8"` → `"application/json"`).
    pub fn content_type(&self) -> Option<String> {
        let raw = self.header("content-type")?;
        let media = raw.split(';').next().unwrap_or(raw).trim();
        Some(media.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&'static str, &'static str)]) -> Request {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, value.parse().unwrap());
        }
        Request::new(
            Method::Post,
            "/api/contact?from=footer".parse().unwrap(),
            map,
            Bytes::from_static(b"{}"),
        )
    }

    #[test]
    fn path_excludes_query() {
        let req = request(&[]);
        assert_eq!(req.path(), "/api/contact");
        assert_eq!(req.body(), b"{}");
    }

    #[test]
    fn content_type_drops_parameters() {
        let req = request(&[("content-type", "Application/JSON; charset=utf-8")]);
        assert_eq!(req.content_type().as_deref(), Some("application/json"));
        assert_eq!(req.header("Content-Type"), Some("Application/JSON; charset=utf-8"));
    }

    #[test]
    fn missing_content_type() {
        assert_eq!(request(&[]).content_type(), None);
    }
}
