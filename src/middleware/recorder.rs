use std::io;

use http::{HeaderMap, StatusCode};

use crate::response::ResponseWriter;

/// A [`ResponseWriter`] wrapper that remembers the status code.
///
/// Every call is forwarded to the wrapped writer untouched. The only thing
/// the recorder adds is a copy of the last status passed to
/// [`write_status`](ResponseWriter::write_status). A handler that never sets
/// a status leaves it at [`None`], even though the server will go on to send
/// its implicit `200 OK`.
pub struct Recorder<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: Option<StatusCode>,
}

impl<'a> Recorder<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, status: None }
    }

    /// The most recent status the handler announced, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl ResponseWriter for Recorder<'_> {
    fn headers(&mut self) -> &mut HeaderMap {
        self.inner.headers()
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn write_status(&mut self, status: StatusCode) {
        self.inner.write_status(status);
        self.status = Some(status);
    }
}
