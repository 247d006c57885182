//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, REFERER, USER_AGENT};
use http::{HeaderMap, Method};

/// An incoming HTTP request with its body fully read.
///
/// The server builds one per request. Tests and custom runtimes can build
/// their own with [`Request::new`] and the `with_*` methods:
///
/// ```rust
/// use httplog::Request;
/// use http::{Method, header};
///
/// let req = Request::new(Method::GET, "/health")
///     .with_remote_addr("192.0.2.1:1234".parse().unwrap())
///     .with_header(header::USER_AGENT, header::HeaderValue::from_static("curl/8.5"));
///
/// assert_eq!(req.user_agent(), "curl/8.5");
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            remote_addr: None,
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(
        parts: http::request::Parts,
        body: Bytes,
        remote_addr: SocketAddr,
    ) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            remote_addr: Some(remote_addr),
            body,
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// The peer address without its port.
    pub fn client_ip(&self) -> Option<IpAddr> {
        self.remote_addr.map(|addr| addr.ip())
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Referer` header, or `""` when the client sent none.
    pub fn referer(&self) -> &str {
        self.headers.get(REFERER).and_then(|v| v.to_str().ok()).unwrap_or_default()
    }

    /// The `User-Agent` header, or `""` when the client sent none.
    pub fn user_agent(&self) -> &str {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).unwrap_or_default()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_strips_port() {
        let req = Request::new(Method::GET, "/")
            .with_remote_addr("[2001:db8::1]:8080".parse().unwrap());
        assert_eq!(req.client_ip(), Some("2001:db8::1".parse().unwrap()));
        assert_eq!(Request::new(Method::GET, "/").client_ip(), None);
    }

    #[test]
    fn missing_referer_and_user_agent_read_empty() {
        let req = Request::new(Method::GET, "/");
        assert_eq!(req.referer(), "");
        assert_eq!(req.user_agent(), "");

        let req = req.with_header(REFERER, HeaderValue::from_static("https://example.com/"));
        assert_eq!(req.header("referer"), Some("https://example.com/"));
        assert_eq!(req.referer(), "https://example.com/");
    }
}
