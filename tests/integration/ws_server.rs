//! Local WebSocket server for streaming session tests.

use futures::{SinkExt, StreamExt};
use std::future::Future;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Accept a single WebSocket connection and hand it to `handler`.
///
/// Returns the HTTP base URL to use as the STT address and a receiver for the
/// handler's output.
pub async fn serve_once<F, Fut, T>(handler: F) -> (String, oneshot::Receiver<T>)
where
    F: FnOnce(ServerSocket) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = tx.send(handler(ws).await);
    });

    (base_url, rx)
}

/// Collect every text frame until the client closes.
pub async fn record_frames(mut ws: ServerSocket) -> Vec<String> {
    let mut frames = Vec::new();
    while let Some(Ok(message)) = ws.next().await {
        match message {
            Message::Text(text) => frames.push(text.as_str().to_string()),
            Message::Close(_) => break,
            _ => {}
        }
    }
    frames
}

/// Send the given text frames, then close the connection cleanly.
pub async fn send_then_close(mut ws: ServerSocket, frames: Vec<&'static str>) {
    for frame in frames {
        ws.send(Message::text(frame)).await.unwrap();
    }
    let _ = ws.close(None).await;
    // Drain until the client acknowledges the close.
    while let Some(Ok(_)) = ws.next().await {}
}
