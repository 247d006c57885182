//! End-to-end: a real server on a loopback port, raw HTTP/1.1 on the wire.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use httplog::middleware::Logger;
use httplog::{Request, ResponseWriter, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

fn health(w: &mut dyn ResponseWriter, _: &Request) {
    let _ = w.text(StatusCode::OK, "OK");
}

fn explode(_: &mut dyn ResponseWriter, _: &Request) {
    panic!("boom");
}

async fn get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {path} HTTP/1.1\r\nHost: localhost\r\nUser-Agent: it-test\r\nReferer: http://ref/\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

#[tokio::test]
async fn requests_are_served_and_logged() {
    let buf = SharedBuf::default();
    let logger = Logger::with_output(buf.clone());
    logger.prefix("svc").recover();

    let app = Router::new()
        .on(Method::GET, "/health", health)
        .on(Method::GET, "/panic", explode);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(logger.middleware(app), async move {
            let _ = stopped.await;
        }),
    );

    let ok = get(addr, "/health").await;
    assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"), "{ok}");
    assert!(ok.ends_with("\r\n\r\nOK"), "{ok}");

    let failed = get(addr, "/panic").await;
    assert!(failed.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{failed}");
    assert!(failed.ends_with("Internal Server Error"), "{failed}");

    let missing = get(addr, "/nope").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"), "{missing}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();

    let out = buf.contents();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "{out}");

    let expected = [("200", "/health"), ("500", "/panic"), ("404", "/nope")];
    for (line, (status, path)) in lines.iter().zip(expected) {
        let f: Vec<&str> = line.split(' ').collect();
        assert_eq!(f.len(), 9, "{line}");
        assert_eq!(f[0], "svc");
        assert_eq!(&f[3..], ["127.0.0.1", status, "GET", path, "http://ref/", "it-test"]);
    }
}

#[tokio::test]
async fn unguarded_panics_fall_back_to_500_without_a_log_line() {
    let buf = SharedBuf::default();
    let logger = Logger::with_output(buf.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(logger.middleware(explode), async move {
            let _ = stopped.await;
        }),
    );

    let res = get(addr, "/").await;
    assert!(res.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{res}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();

    assert!(buf.contents().is_empty());
}
