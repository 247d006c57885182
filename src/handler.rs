//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! The router holds handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so handlers are stored as **trait objects** (`Arc<dyn Handler>`):
//!
//! ```text
//! fn hello(w: &mut dyn ResponseWriter, req: &Request) { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! Arc::new(hello) as BoxedHandler                            ← one allocation, at startup
//!        ↓
//! handler.serve(&mut writer, &req)  at request time          ← one vtable dispatch
//! ```
//!
//! Handlers are synchronous. The server runs each request on tokio's
//! blocking pool, so a slow handler occupies one pool thread and never
//! stalls the accept loop.
//!
//! # Composition
//!
//! Anything implementing [`Handler`] can wrap another [`Handler`] and is one
//! itself. That is all a middleware is:
//!
//! ```rust
//! use httplog::{Handler, Request, ResponseWriter};
//!
//! struct PoweredBy<H>(H);
//!
//! impl<H: Handler> Handler for PoweredBy<H> {
//!     fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
//!         w.headers().insert("x-powered-by", "httplog".parse().unwrap());
//!         self.0.serve(w, req);
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Answers one request by writing into `w`.
///
/// Implemented automatically for every function or closure with the
/// signature:
///
/// ```text
/// fn name(w: &mut dyn ResponseWriter, req: &Request)
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        self(w, req)
    }
}
