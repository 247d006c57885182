//! Request logging.
//!
//! A [`Logger`] wraps a handler and writes one plain-text line per request
//! to its sink:
//!
//! ```text
//! [prefix] <timestamp> <duration> <client-ip> <status> <method> <path> <referer> <user-agent>
//! svc 2024-05-01T09:12:44.120931+02:00 182.4µs 192.0.2.1 200 GET /health  curl/8.5.0
//! ```
//!
//! Fields are separated by single spaces and never quoted, so an empty
//! referer shows up as two adjacent spaces. A status of `0` means the handler
//! never called [`write_status`](crate::ResponseWriter::write_status) and
//! the server sent its implicit `200 OK`.
//!
//! The handler runs without any lock held, and the line is formatted from a
//! snapshot of the settings after the lock is released. Configuration calls
//! and the final write share one mutex, so lines from concurrent requests
//! never interleave.

use std::any::Any;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat};
use http::StatusCode;
use tracing::warn;

use super::recorder::Recorder;
use super::recover::{PanicHandler, internal_server_error, serve_guarded};
use crate::error::Error;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::ResponseWriter;

/// RFC 3339 in local time with a variable-precision fraction.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Logged in place of the status when the handler never announced one.
pub const UNSET_STATUS: u16 = 0;

/// A shared, reconfigurable request logger.
///
/// `Logger` is a cheap handle: clones share the same sink and settings, and
/// every configuration call takes `&self` and returns it for chaining, so the
/// logger can be reconfigured while servers are using it.
///
/// ```rust,no_run
/// use httplog::{Request, ResponseWriter, Router, Server};
/// use httplog::middleware::Logger;
/// use http::{Method, StatusCode};
///
/// # async fn run() -> Result<(), httplog::Error> {
/// let logger = Logger::new();
/// logger.output_file("access.log").prefix("my-app").time_format("%d/%b/%Y:%H:%M:%S").recover();
///
/// let app = Router::new().on(Method::GET, "/", |w: &mut dyn ResponseWriter, _: &Request| {
///     let _ = w.text(StatusCode::OK, "OK");
/// });
///
/// Server::bind("0.0.0.0:8000").serve(logger.middleware(app)).await
/// # }
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    out: Box<dyn Write + Send>,
    layout: Arc<Layout>,
    panic_handler: Option<PanicHandler>,
}

/// Everything that shapes a line. Snapshotted per request so formatting
/// happens outside the lock.
#[derive(Clone)]
struct Layout {
    time_format: String,
    prefix: Vec<String>,
}

impl Logger {
    /// A logger writing to stdout with [`DEFAULT_TIME_FORMAT`], no prefix and
    /// no panic recovery.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// A logger writing to `out`.
    pub fn with_output(out: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                out: Box::new(out),
                layout: Arc::new(Layout {
                    time_format: DEFAULT_TIME_FORMAT.to_owned(),
                    prefix: Vec::new(),
                }),
                panic_handler: None,
            })),
        }
    }

    /// A logger appending to the named file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be opened. See [`Logger::output_file`].
    pub fn file(name: impl AsRef<Path>) -> Self {
        let logger = Self::new();
        logger.output_file(name);
        logger
    }

    /// Appends to the named file from now on, creating it with mode `0644`
    /// if it does not exist.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be opened: a logger that cannot reach its
    /// destination must not keep running half-configured. Use
    /// [`try_output_file`](Logger::try_output_file) to handle the error.
    pub fn output_file(&self, name: impl AsRef<Path>) -> &Self {
        self.try_output_file(name).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`output_file`](Logger::output_file). The current
    /// sink is left in place on error.
    pub fn try_output_file(&self, name: impl AsRef<Path>) -> Result<&Self, Error> {
        let path = name.as_ref();
        let file = open_append(path).map_err(|source| Error::OpenLog {
            path: path.to_owned(),
            source,
        })?;
        Ok(self.output(file))
    }

    /// Replaces the sink.
    ///
    /// The previous sink is flushed and dropped once the lock is released.
    /// Dropping a file closes it; dropping the default stdout handle leaves
    /// the process's stdout open.
    pub fn output(&self, out: impl Write + Send + 'static) -> &Self {
        let mut previous = std::mem::replace(&mut self.lock().out, Box::new(out));
        if let Err(e) = previous.flush() {
            warn!(error = %e, "failed to flush replaced log sink");
        }
        self
    }

    /// Sets the field written before every line. An empty string removes it.
    pub fn prefix(&self, prefix: &str) -> &Self {
        let prefix = if prefix.is_empty() {
            Vec::new()
        } else {
            vec![prefix.to_owned()]
        };
        Arc::make_mut(&mut self.lock().layout).prefix = prefix;
        self
    }

    /// Sets the timestamp layout, in [`chrono::format::strftime`] syntax.
    ///
    /// # Panics
    ///
    /// Panics if `layout` contains an invalid specifier.
    pub fn time_format(&self, layout: &str) -> &Self {
        if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
            panic!("invalid time format {layout:?}");
        }
        Arc::make_mut(&mut self.lock().layout).time_format = layout.to_owned();
        self
    }

    /// Recovers handler panics with [`internal_server_error`].
    pub fn recover(&self) -> &Self {
        self.recover_with(internal_server_error)
    }

    /// Recovers handler panics with `handler`.
    ///
    /// Once installed, recovery cannot be switched off again; later calls only
    /// replace the handler. The setting is read per request, so it also
    /// applies to middleware built before the call.
    pub fn recover_with<F>(&self, handler: F) -> &Self
    where
        F: Fn(&mut dyn ResponseWriter, &Request, &(dyn Any + Send)) + Send + Sync + 'static,
    {
        self.lock().panic_handler = Some(Arc::new(handler));
        self
    }

    /// Wraps `next` so every request through it is logged.
    pub fn middleware<H: Handler>(&self, next: H) -> Logged<H> {
        Logged { logger: self.clone(), next }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded state is plain data; a panic mid-update cannot leave it
        // inconsistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn panic_handler(&self) -> Option<PanicHandler> {
        self.lock().panic_handler.clone()
    }

    fn log(&self, time: DateTime<Local>, elapsed: Duration, status: Option<StatusCode>, req: &Request) {
        let ip = req.client_ip().map(|ip| ip.to_string()).unwrap_or_default();
        let status = status.map_or(UNSET_STATUS, |s| s.as_u16());

        let layout = Arc::clone(&self.lock().layout);
        let line = layout.entry(time, elapsed, &ip, status, req);

        let mut inner = self.lock();
        let out = &mut inner.out;
        if let Err(e) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
            warn!(error = %e, path = req.path(), "failed to write request log line");
        }
    }
}

impl Default for Logger {
    fn default() -> Self { Self::new() }
}

impl Layout {
    fn entry(&self, time: DateTime<Local>, elapsed: Duration, ip: &str, status: u16, req: &Request) -> String {
        let mut line = String::with_capacity(160);
        for field in &self.prefix {
            line.push_str(field);
            line.push(' ');
        }

        let mark = line.len();
        if write!(line, "{}", time.format(&self.time_format)).is_err() {
            line.truncate(mark);
            line.push_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, false));
        }

        let _ = writeln!(
            line,
            " {elapsed:?} {ip} {status} {} {} {} {}",
            req.method(),
            req.path(),
            req.referer(),
            req.user_agent(),
        );
        line
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path)
}

/// A handler wrapped by [`Logger::middleware`].
pub struct Logged<H> {
    logger: Logger,
    next: H,
}

impl<H: Handler> Handler for Logged<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        let time = Local::now();
        let start = Instant::now();

        let mut rec = Recorder::new(w);
        match self.logger.panic_handler() {
            Some(handler) => serve_guarded(&self.next, &handler, &mut rec, req),
            None => self.next.serve(&mut rec, req),
        }

        self.logger.log(time, start.elapsed(), rec.status(), req);
    }
}
