use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::StatusCode;
use tracing::error;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Turns a recovered handler panic into a response.
///
/// Receives the same writer the panicking handler was given, the request,
/// and the panic payload.
pub type PanicHandler =
    Arc<dyn Fn(&mut dyn ResponseWriter, &Request, &(dyn Any + Send)) + Send + Sync>;

/// The default [`PanicHandler`]: `500 Internal Server Error` with the status
/// text as a plain-text body.
pub fn internal_server_error(w: &mut dyn ResponseWriter, _req: &Request, _panic: &(dyn Any + Send)) {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let _ = w.text(status, status.canonical_reason().unwrap_or_default());
}

/// Wraps `next` so that a panic inside it is answered by `handler` instead of
/// unwinding into the server.
///
/// ```rust
/// use std::sync::Arc;
/// use httplog::{Request, Response, ResponseWriter, Handler};
/// use httplog::middleware::{internal_server_error, recover};
///
/// fn boom(_: &mut dyn ResponseWriter, _: &Request) {
///     panic!("boom");
/// }
///
/// let guarded = recover(boom, Arc::new(internal_server_error));
///
/// let mut res = Response::new();
/// guarded.serve(&mut res, &Request::new(http::Method::GET, "/"));
/// assert_eq!(res.status_code(), 500);
/// ```
pub fn recover<H: Handler>(next: H, handler: PanicHandler) -> Recover<H> {
    Recover { next, handler }
}

/// A handler guarded by a [`PanicHandler`]. Built with [`recover`].
pub struct Recover<H> {
    next: H,
    handler: PanicHandler,
}

impl<H: Handler> Handler for Recover<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        serve_guarded(&self.next, &self.handler, w, req);
    }
}

/// Runs `next` and, if it panics, `handler`. Returns normally either way.
pub(crate) fn serve_guarded<H: Handler + ?Sized>(
    next: &H,
    handler: &PanicHandler,
    w: &mut dyn ResponseWriter,
    req: &Request,
) {
    // Only the writer is touched after an unwind, and only to append.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| next.serve(&mut *w, req)));

    if let Err(payload) = outcome {
        error!(
            method = %req.method(),
            path = req.path(),
            panic = panic_message(payload.as_ref()),
            "recovered handler panic"
        );
        handler(w, req, payload.as_ref());
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use http::Method;

    fn will_panic(_: &mut dyn ResponseWriter, _: &Request) {
        panic!("handler panic!");
    }

    #[test]
    fn default_handler_answers_500() {
        let guarded = recover(will_panic, Arc::new(internal_server_error));
        let mut res = Response::new();
        guarded.serve(&mut res, &Request::new(Method::GET, "/"));

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body(), b"Internal Server Error");
    }

    fn echo_panic(w: &mut dyn ResponseWriter, _: &Request, panic: &(dyn Any + Send)) {
        let _ = w.text(StatusCode::SERVICE_UNAVAILABLE, panic_message(panic));
    }

    #[test]
    fn custom_handler_sees_the_payload() {
        let guarded = recover(will_panic, Arc::new(echo_panic));
        let mut res = Response::new();
        guarded.serve(&mut res, &Request::new(Method::GET, "/"));

        assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(res.body(), b"handler panic!");
    }

    #[test]
    fn no_panic_leaves_response_alone() {
        let guarded = recover(
            |w: &mut dyn ResponseWriter, _: &Request| {
                let _ = w.text(StatusCode::OK, "fine");
            },
            Arc::new(internal_server_error),
        );
        let mut res = Response::new();
        guarded.serve(&mut res, &Request::new(Method::GET, "/"));

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"fine");
    }

    #[test]
    fn formatted_payload_is_readable() {
        let payload: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "code 7");
    }
}
