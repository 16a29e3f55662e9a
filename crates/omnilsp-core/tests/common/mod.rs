//! Shared test support: a stub OmniSharp HTTP backend and helpers for
//! driving the framed editor stream in memory.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Canned response served by the stub backend.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: String,
    /// Artificial delay before responding.
    pub delay: Duration,
}

impl StubResponse {
    /// A 200 response with the given JSON body.
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Add an artificial delay before the response is written.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A minimal HTTP/1.1 server standing in for OmniSharp.
///
/// Accepts connections until dropped, answers every request with the
/// configured response, and records each request body for assertions.
pub struct StubBackend {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    accept_task: tokio::task::JoinHandle<()>,
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        // Stops the accept loop and releases the port.
        self.accept_task.abort();
    }
}

impl StubBackend {
    /// Bind to an ephemeral local port and start serving.
    pub async fn spawn(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let response = response.clone();
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let _ = handle_connection(stream, response, recorded).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            accept_task,
        }
    }

    /// Base URL for pointing a client at this stub.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bodies of every request received so far.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

async fn handle_connection(
    mut stream: tokio::net::TcpStream,
    response: StubResponse,
    recorded: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    // Read until the end of headers.
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    recorded
        .lock()
        .await
        .push(String::from_utf8_lossy(&body).to_string());

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let reply = format!(
        "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Write one Content-Length framed message to the editor-side pipe.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, value: &Value) {
    let content = value.to_string();
    let frame = format!("Content-Length: {}\r\n\r\n{}", content.len(), content);
    writer
        .write_all(frame.as_bytes())
        .await
        .expect("write frame");
    writer.flush().await.expect("flush frame");
}

/// Read one Content-Length framed message from the editor-side pipe.
///
/// Returns `None` when the stream closes before a frame starts.
pub async fn read_frame<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<Value> {
    let mut content_length = None;
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await.expect("read header line");
        if n == 0 {
            return None;
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        if let Some((key, value)) = line.trim_end().split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok();
            }
        }
    }

    let length = content_length.expect("Content-Length header");
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await.expect("read frame body");
    Some(serde_json::from_slice(&body).expect("frame body is JSON"))
}
