//! Mock HTTP servers for integration tests

use ai_voice_rust::{VoiceClient, VoiceClientBuilder};
use mockito::{Mock, Server, ServerGuard};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Test fixture that manages a mockito server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Builder pointing all three services at the mock server, with a short backoff.
    pub fn client_builder(&self) -> VoiceClientBuilder {
        VoiceClient::builder()
            .translation_url(&self.base_url)
            .stt_url(&self.base_url)
            .tts_url(&self.base_url)
            .timeout(Duration::from_secs(5))
            .retry_delay(Duration::from_millis(10))
    }

    pub fn client(&self) -> VoiceClient {
        self.client_builder().build().expect("valid test config")
    }

    /// Create a mock for a JSON response
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

/// A canned reply for [`ScriptedServer`]. `Hang` accepts the request and never answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, &'static str),
    Hang,
}

/// Minimal HTTP/1.1 server that answers the n-th connection with the n-th reply
/// (repeating the last one) and records when each connection arrived.
///
/// Every reply closes the connection, so each attempt is a new connection.
pub struct ScriptedServer {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Instant>>>,
    task: tokio::task::JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn start(replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(Mutex::new(Vec::new()));

        let recorded = hits.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let index = {
                    let mut hits = recorded.lock().unwrap();
                    hits.push(Instant::now());
                    hits.len() - 1
                };
                let reply = replies[index.min(replies.len() - 1)].clone();
                tokio::spawn(serve(socket, reply));
            }
        });

        Self {
            base_url,
            hits,
            task,
        }
    }

    pub fn hits(&self) -> Vec<Instant> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut socket: TcpStream, reply: Reply) {
    if read_request(&mut socket).await.is_err() {
        return;
    }
    match reply {
        Reply::Status(status, body) => {
            let response = format!(
                "HTTP/1.1 {} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Reply::Hang => {
            // Keep the socket open until the runtime shuts down.
            let _held = socket;
            std::future::pending::<()>().await;
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < pos + 4 + body_len {
                let n = socket.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return Ok(());
        }
    }
}

/// Base URL of a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
