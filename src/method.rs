//! HTTP method as a typed enum.
//!
//! Only the RFC 9110 methods a small site actually routes on. Anything else
//! (WebDAV verbs, `PURGE`, extension methods) is rejected by the server with
//! `405 Method Not Allowed` before it reaches the router.

use std::fmt;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
        }
    }

    /// Maps hyper's method type onto the routable subset.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        match method.as_str() {
            "DELETE"  => Some(Self::Delete),
            "GET"     => Some(Self::Get),
            "HEAD"    => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "PATCH"   => Some(Self::Patch),
            "POST"    => Some(Self::Post),
            "PUT"     => Some(Self::Put),
            _         => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Method;

    #[test]
    fn maps_standard_methods() {
        assert_eq!(Method::from_http(&http::Method::GET), Some(Method::Get));
        assert_eq!(Method::from_http(&http::Method::POST), Some(Method::Post));
        assert_eq!(Method::Head.to_string(), "HEAD");
    }

    #[test]
    fn rejects_extension_methods() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(Method::from_http(&purge), None);
        assert_eq!(Method::from_http(&http::Method::TRACE), None);
    }
}
