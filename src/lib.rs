//! # httplog
//!
//! HTTP request logging for Rust services, plus the small hyper-based
//! runtime it plugs into. One line per request, to one sink, never torn.
//!
//! ## The contract
//!
//! The logger observes. It never changes what a handler writes, never fails
//! a request because the log sink is unhappy, and never holds its lock while
//! your handler runs.
//!
//! What httplog intentionally does not do:
//!
//! - **Structured encoding** — lines are plain text, space separated
//! - **Rotation** — point `logrotate` at the file, the logger appends
//! - **Sampling / rate limiting** — every request gets its line
//! - **Trace correlation** — use `tracing` spans for that
//!
//! What it does:
//!
//! - [`middleware::Logger`] — timestamp, duration, client IP, status, method,
//!   path, referer and user agent for every request
//! - [`middleware::Recorder`] — observes the status code a handler sets
//! - [`middleware::recover`] — optional panic boundary so failing requests
//!   are answered and still logged
//! - [`Router`] and [`Server`] — radix-tree routing and a graceful-shutdown
//!   hyper server, enough to run the above
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use httplog::{Request, ResponseWriter, Router, Server};
//! use httplog::middleware::Logger;
//! use http::{Method, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .on(Method::GET, "/health",     health)
//!         .on(Method::GET, "/users/{id}", get_user);
//!
//!     let logger = Logger::new();
//!     logger.prefix("my-app").recover();
//!
//!     Server::bind("0.0.0.0:3000").serve(logger.middleware(app)).await.unwrap();
//! }
//!
//! fn health(w: &mut dyn ResponseWriter, _req: &Request) {
//!     let _ = w.text(StatusCode::OK, "OK");
//! }
//!
//! fn get_user(w: &mut dyn ResponseWriter, req: &Request) {
//!     let id = req.param("id").unwrap_or("unknown");
//!     // httplog sends bytes — it doesn't care how you build them:
//!     //   serde_json::to_vec(&user).unwrap()
//!     //   format!(r#"{{"id":"{id}"}}"#).into_bytes()
//!     let _ = w.bytes(StatusCode::OK, httplog::ContentType::Json, format!(r#"{{"id":"{id}"}}"#).as_bytes());
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxedHandler, Handler};
pub use request::Request;
pub use response::{ContentType, Response, ResponseWriter};
pub use router::Router;
pub use server::Server;
