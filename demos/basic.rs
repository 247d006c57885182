//! Minimal httplog example — a few routes behind the request logger.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/health
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl http://localhost:3000/panic
//!
//! Every request prints one access-log line to stdout (and to `access.log`
//! when `ACCESS_LOG` is set).

use http::{Method, StatusCode};
use httplog::middleware::Logger;
use httplog::{ContentType, Request, ResponseWriter, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .on(Method::GET,    "/health",     health)
        .on(Method::GET,    "/users/{id}", get_user)
        .on(Method::POST,   "/users",      create_user)
        .on(Method::DELETE, "/users/{id}", delete_user)
        .on(Method::GET,    "/panic",      explode);

    let logger = Logger::new();
    logger.prefix("demo").recover();
    if let Ok(path) = std::env::var("ACCESS_LOG") {
        logger.output_file(path);
    }

    Server::bind("0.0.0.0:3000")
        .serve(logger.middleware(app))
        .await
        .expect("server error");
}

// GET /health → 200 "OK"
fn health(w: &mut dyn ResponseWriter, _req: &Request) {
    let _ = w.text(StatusCode::OK, "OK");
}

// GET /users/{id}
fn get_user(w: &mut dyn ResponseWriter, req: &Request) {
    let id = req.param("id").unwrap_or("unknown");
    let body = format!(r#"{{"id":"{id}","name":"alice"}}"#);
    let _ = w.bytes(StatusCode::OK, ContentType::Json, body.as_bytes());
}

// POST /users
//
// req.body() is &[u8] — parse with serde_json::from_slice, simd-json, etc.
fn create_user(w: &mut dyn ResponseWriter, req: &Request) {
    if req.body().is_empty() {
        w.write_status(StatusCode::BAD_REQUEST);
        return;
    }

    w.headers().insert("location", "/users/99".parse().expect("static header value"));
    let _ = w.bytes(StatusCode::CREATED, ContentType::Json, br#"{"id":"99","name":"new_user"}"#);
}

// DELETE /users/{id} → 204 No Content
fn delete_user(w: &mut dyn ResponseWriter, _req: &Request) {
    w.write_status(StatusCode::NO_CONTENT);
}

// GET /panic → 500, still logged thanks to `recover()`
fn explode(_w: &mut dyn ResponseWriter, _req: &Request) {
    panic!("boom");
}
