//! Helpers for driving a running server over raw HTTP/1.1

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mjpeg_nvr::capture::SourceSpec;
use mjpeg_nvr::registry::CameraId;
use mjpeg_nvr::server::CameraConfig;
use mjpeg_nvr::{NvrServer, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const PART_HEADER: &[u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";

/// Server running on an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub server: Arc<NvrServer>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<mjpeg_nvr::error::Result<()>>,
}

impl TestServer {
    pub async fn start(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(NvrServer::new(config).unwrap());
        let (tx, rx) = oneshot::channel::<()>();

        let serving = Arc::clone(&server);
        let task = tokio::spawn(async move {
            serving
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
        });

        Self {
            addr,
            server,
            shutdown: Some(tx),
            task,
        }
    }

    /// Wait until every camera has published at least one frame
    pub async fn wait_for_frames(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.server.registry().entries().all(|e| !e.slot().is_empty()) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

/// Config with the two cameras from the reference scenario
pub fn two_cameras() -> ServerConfig {
    let source = SourceSpec::TestPattern {
        width: 320,
        height: 240,
    };
    ServerConfig::default()
        .cameras(vec![
            CameraConfig::new(CameraId::new(0), "Bedroom", source.clone()),
            CameraConfig::new(CameraId::new(1), "Living Room", source),
        ])
        .stats_interval(Duration::from_secs(3600))
}

/// A complete, non-streaming response
pub struct Response {
    pub status: u16,
    /// Header block, lowercased
    pub headers: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issue `GET path` with `Connection: close` and read the whole response
pub async fn get(addr: SocketAddr, path: &str) -> Response {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("response timed out")
        .unwrap();

    let split = find(&raw, b"\r\n\r\n").expect("no header terminator");
    let (status, headers) = parse_head(&raw[..split]);
    Response {
        status,
        headers,
        body: raw[split + 4..].to_vec(),
    }
}

/// A streaming response read incrementally
pub struct StreamClient {
    stream: TcpStream,
    raw: Vec<u8>,
    pub status: u16,
    pub headers: String,
    /// Dechunked body bytes received so far
    pub body: Vec<u8>,
    pub finished: bool,
}

impl StreamClient {
    /// Issue `GET path` and read the response head
    pub async fn open(addr: SocketAddr, path: &str) -> Self {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, addr);
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut client = Self {
            stream,
            raw: Vec::new(),
            status: 0,
            headers: String::new(),
            body: Vec::new(),
            finished: false,
        };

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        let split = loop {
            if let Some(split) = find(&client.raw, b"\r\n\r\n") {
                break split;
            }
            assert!(client.read_some(deadline).await, "connection closed before headers");
        };

        let (status, headers) = parse_head(&client.raw[..split]);
        client.status = status;
        client.headers = headers;
        client.raw.drain(..split + 4);
        client
    }

    /// Keep reading body bytes for `window`
    pub async fn read_for(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        while !self.finished && self.read_some(deadline).await {
            self.dechunk();
        }
        self.dechunk();
    }

    /// Read until `count` complete parts arrived or `timeout` elapsed
    pub async fn read_parts(&mut self, count: usize, timeout: Duration) -> Vec<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            self.dechunk();
            let parts = complete_parts(&self.body);
            if parts.len() >= count || self.finished {
                return parts;
            }
            if !self.read_some(deadline).await {
                self.dechunk();
                return complete_parts(&self.body);
            }
        }
    }

    async fn read_some(&mut self, deadline: tokio::time::Instant) -> bool {
        let mut buf = [0u8; 16 * 1024];
        match tokio::time::timeout_at(deadline, self.stream.read(&mut buf)).await {
            Ok(Ok(0)) => {
                self.finished = true;
                false
            }
            Ok(Ok(n)) => {
                self.raw.extend_from_slice(&buf[..n]);
                true
            }
            Ok(Err(_)) => {
                self.finished = true;
                false
            }
            Err(_) => false,
        }
    }

    fn dechunk(&mut self) {
        loop {
            let Some(line_end) = find(&self.raw, b"\r\n") else {
                return;
            };
            let line = String::from_utf8_lossy(&self.raw[..line_end]).into_owned();
            let size_text = line.split(';').next().unwrap_or("").trim();
            let size = usize::from_str_radix(size_text, 16).expect("bad chunk size");

            if size == 0 {
                self.finished = true;
                self.raw.clear();
                return;
            }

            let start = line_end + 2;
            if self.raw.len() < start + size + 2 {
                return;
            }
            self.body.extend_from_slice(&self.raw[start..start + size]);
            self.raw.drain(..start + size + 2);
        }
    }
}

/// JPEG payloads of every part that is followed by another part
///
/// The trailing part is only included once the stream has ended.
pub fn complete_parts(body: &[u8]) -> Vec<Vec<u8>> {
    let mut starts = Vec::new();
    let mut offset = 0;
    while let Some(pos) = find(&body[offset..], PART_HEADER) {
        starts.push(offset + pos);
        offset += pos + PART_HEADER.len();
    }

    let mut parts = Vec::new();
    for pair in starts.windows(2) {
        let payload = &body[pair[0] + PART_HEADER.len()..pair[1]];
        assert!(payload.ends_with(b"\r\n"), "part must end with CRLF");
        parts.push(payload[..payload.len() - 2].to_vec());
    }
    parts
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_head(head: &[u8]) -> (u16, String) {
    let head = String::from_utf8_lossy(head).into_owned();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("bad status line");
    (status, head.to_ascii_lowercase())
}
