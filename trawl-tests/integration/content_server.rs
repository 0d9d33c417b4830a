//! Local HTTP fixture serving deterministic content bytes.

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use axum::response::Response;
use axum::routing::get;
use futures::stream;

/// Size of every served payload.
pub const PAYLOAD_LEN: usize = 65_536;

/// A running fixture server; aborted when dropped.
pub struct ContentServer {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl ContentServer {
    /// URL serving a complete payload for the given name.
    pub fn file_url(&self, name: &str) -> String {
        format!("http://{}/files/{name}", self.addr)
    }

    /// URL whose response stream fails partway through.
    pub fn broken_url(&self) -> String {
        format!("http://{}/broken", self.addr)
    }
}

impl Drop for ContentServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Deterministic payload derived from a file name.
pub fn payload_for(name: &str) -> Vec<u8> {
    name.as_bytes()
        .iter()
        .copied()
        .cycle()
        .take(PAYLOAD_LEN)
        .collect()
}

/// Spawns the fixture server on an ephemeral port.
pub async fn spawn() -> ContentServer {
    let app = Router::new()
        .route("/files/{name}", get(serve_file))
        .route("/broken", get(serve_broken));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ContentServer { addr, handle }
}

async fn serve_file(Path(name): Path<String>) -> Vec<u8> {
    payload_for(&name)
}

/// Sends a few bytes, then kills the stream mid-body.
async fn serve_broken() -> Response {
    let chunks: Vec<Result<&'static [u8], std::io::Error>> = vec![
        Ok(b"partial-bytes".as_slice()),
        Err(std::io::Error::other("stream interrupted")),
    ];

    Response::builder()
        .body(Body::from_stream(stream::iter(chunks)))
        .unwrap()
}
