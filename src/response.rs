//! The response-writing interface and the runtime's buffered implementation.
//!
//! Handlers never build a response value and return it. They receive a
//! `&mut dyn ResponseWriter` and push headers, a status and body bytes into
//! it. Because the writer is a trait object, middleware can slip its own
//! implementation in front of the real one (see
//! [`Recorder`](crate::middleware::Recorder)) without the handler noticing.

use std::io;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::bytes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / file download)
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// The capability set a handler uses to answer a request.
///
/// Three required methods, mirroring what an HTTP response is made of:
/// header access, body bytes and the status line. Everything else is a
/// provided convenience built on those three, so a wrapper only has to
/// forward the required ones to stay transparent.
///
/// ```rust
/// use httplog::{ContentType, Request, ResponseWriter};
/// use http::StatusCode;
///
/// fn hello(w: &mut dyn ResponseWriter, _req: &Request) {
///     let _ = w.bytes(StatusCode::OK, ContentType::Json, br#"{"hello":"world"}"#);
/// }
/// ```
pub trait ResponseWriter {
    /// Mutable access to the response headers.
    fn headers(&mut self) -> &mut HeaderMap;

    /// Appends body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Sets the response status.
    fn write_status(&mut self, status: StatusCode);

    /// Writes the whole buffer, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Sets the content type and status, then writes `body`.
    fn bytes(&mut self, status: StatusCode, content_type: ContentType, body: &[u8]) -> io::Result<()> {
        self.headers().insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.write_status(status);
        self.write_all(body)
    }

    /// Plain-text shorthand for [`bytes`](ResponseWriter::bytes).
    fn text(&mut self, status: StatusCode, body: &str) -> io::Result<()> {
        self.bytes(status, ContentType::Text, body.as_bytes())
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// The server's own [`ResponseWriter`]: buffers everything in memory and is
/// turned into a hyper response once the handler returns.
///
/// It follows the usual server conventions:
///
/// - the first [`write_status`](ResponseWriter::write_status) wins, later
///   calls are ignored;
/// - the first body write commits `200 OK` if no status was set yet;
/// - a response that never set a status is sent as `200 OK`.
///
/// That implicit `200` is never announced through the trait, which is why a
/// wrapper observing `write_status` may see no status at all.
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status that will be sent.
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Case-insensitive response header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let status = self.status_code();
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl ResponseWriter for Response {
    fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(sent) => warn!(%sent, ignored = %status, "superfluous write_status call"),
            None => self.status = Some(status),
        }
    }
}
