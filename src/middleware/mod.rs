//! Middleware layer.
//!
//! Middleware wraps a [`Handler`](crate::Handler) in another handler and is
//! the right place for cross-cutting concerns. Everything here composes the
//! same way: take a handler, return a handler.
//!
//! - [`Logger`] — one access-log line per request, written to a shared sink
//! - [`Recorder`] — observes the status a handler announces
//! - [`recover`] — answers handler panics instead of letting them unwind
//!
//! ```rust
//! use httplog::{Request, Response, ResponseWriter, Handler};
//! use httplog::middleware::Logger;
//! use http::{Method, StatusCode};
//!
//! let logger = Logger::with_output(std::io::sink());
//! logger.prefix("svc").recover();
//!
//! let app = logger.middleware(|w: &mut dyn ResponseWriter, _: &Request| {
//!     let _ = w.text(StatusCode::OK, "OK");
//! });
//!
//! let mut res = Response::new();
//! app.serve(&mut res, &Request::new(Method::GET, "/health"));
//! assert_eq!(res.body(), b"OK");
//! ```

mod logger;
mod recorder;
mod recover;

pub use logger::{DEFAULT_TIME_FORMAT, Logged, Logger, UNSET_STATUS};
pub use recorder::Recorder;
pub use recover::{PanicHandler, Recover, internal_server_error, recover};
