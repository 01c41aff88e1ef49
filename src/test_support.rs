//! Minimal HTTP/1.1 responder for exercising fetches and downloads in tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    status: u16,
    /// Body, written piece by piece with `delay` between pieces
    chunks: Vec<Vec<u8>>,
    delay: Duration,
    hang: bool,
}

impl Route {
    /// 200 with the given body
    pub fn ok(path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            chunks: vec![body.into()],
            delay: Duration::ZERO,
            hang: false,
        }
    }

    /// Empty response with the given status
    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            status,
            chunks: Vec::new(),
            delay: Duration::ZERO,
            hang: false,
        }
    }

    /// Accepts the request but never answers
    pub fn hang(path: &str) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            chunks: Vec::new(),
            delay: Duration::ZERO,
            hang: true,
        }
    }

    /// 200 whose body arrives in `chunks`, pausing `delay` before each one
    /// after the first
    pub fn trickle(path: &str, chunks: Vec<Vec<u8>>, delay: Duration) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            chunks,
            delay,
            hang: false,
        }
    }
}

/// Serves `routes` on an ephemeral localhost port until the test runtime ends
pub async fn serve(routes: Vec<Route>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let _ = respond(stream, &routes).await;
            });
        }
    });

    addr
}

async fn respond(mut stream: TcpStream, routes: &[Route]) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let target = request.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target);

    let route = routes.iter().find(|route| route.path == path);
    let (status, chunks, delay) = match route {
        Some(route) if route.hang => {
            tokio::time::sleep(Duration::from_secs(300)).await;
            return Ok(());
        }
        Some(route) => (route.status, route.chunks.as_slice(), route.delay),
        None => (404, &[][..], Duration::ZERO),
    };
    let length = chunks.iter().map(Vec::len).sum::<usize>();

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n",
        status,
        if (200..300).contains(&status) { "OK" } else { "Error" },
        length
    );
    stream.write_all(head.as_bytes()).await?;
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        stream.write_all(chunk).await?;
        stream.flush().await?;
    }
    stream.shutdown().await
}
