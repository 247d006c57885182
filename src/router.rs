//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. The router is itself a [`Handler`], so it can be wrapped by
//! any middleware before it is handed to the server.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::ResponseWriter;

/// The application router.
///
/// Build it once at startup; pass it (or a middleware wrapping it) to
/// [`Server::serve`](crate::Server::serve). Each [`Router::on`] call returns
/// `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use httplog::{Request, ResponseWriter, Router};
    /// # use http::Method;
    /// # fn get_user(_: &mut dyn ResponseWriter, _: &Request) {}
    /// # fn create_user(_: &mut dyn ResponseWriter, _: &Request) {}
    /// # fn delete_user(_: &mut dyn ResponseWriter, _: &Request) {}
    /// Router::new()
    ///     .on(Method::DELETE, "/users/{id}", delete_user)
    ///     .on(Method::GET,    "/users/{id}", get_user)
    ///     .on(Method::POST,   "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Handler for Router {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) if params.is_empty() => handler.serve(w, req),
            Some((handler, params)) => handler.serve(w, &req.clone().with_params(params)),
            None => w.write_status(StatusCode::NOT_FOUND),
        }
    }
}
