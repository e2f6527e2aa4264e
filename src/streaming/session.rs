//! Streaming transcription session over a WebSocket.
//!
//! A background task owns the socket. The [`StreamingSession`] handle pushes
//! commands to it and [`SessionEvents`] receives everything it observes.

use super::frame::{
    parse_inbound, FinalTranscript, InboundMessage, OutboundFrame, PartialTranscript, StreamConfig,
};
use crate::{Error, Result};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

/// Lifecycle state of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SessionState::Connecting,
            1 => SessionState::Open,
            2 => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Connecting => write!(f, "Connecting"),
            SessionState::Open => write!(f, "Open"),
            SessionState::Closing => write!(f, "Closing"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Events published by a session, in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    Opened,
    Partial(PartialTranscript),
    Final(FinalTranscript),
    /// Parse failures, remote error notices and connection failures.
    Error(Error),
    /// Always the last event of a session.
    Closed,
}

#[derive(Debug, Clone)]
struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new(state: SessionState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

enum Command {
    Frame(String),
    Stop,
}

/// Handle to one streaming transcription session.
///
/// Dropping the handle closes the connection.
#[derive(Debug)]
pub struct StreamingSession {
    state: StateCell,
    commands: mpsc::UnboundedSender<Command>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Frame(_) => write!(f, "Frame"),
            Command::Stop => write!(f, "Stop"),
        }
    }
}

impl StreamingSession {
    /// Start connecting to `url` and return immediately.
    ///
    /// The handle starts in [`SessionState::Connecting`]. Must be called from
    /// within a Tokio runtime.
    pub fn open(
        url: impl Into<String>,
        config: StreamConfig,
        connect_timeout: Duration,
    ) -> (Self, SessionEvents) {
        let state = StateCell::new(SessionState::Connecting);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let driver = SessionDriver {
            url: url.into(),
            config,
            connect_timeout,
            state: state.clone(),
            events: event_tx,
        };
        tokio::spawn(driver.run(command_rx));

        (
            Self {
                state,
                commands: command_tx,
            },
            SessionEvents {
                inner: UnboundedReceiverStream::new(event_rx),
            },
        )
    }

    /// Send one audio chunk. Dropped silently unless the session is open.
    pub fn send(&self, chunk: &[u8]) {
        if self.state.load() != SessionState::Open {
            debug!(state = %self.state.load(), bytes = chunk.len(), "dropping audio chunk");
            return;
        }
        match OutboundFrame::audio_chunk(chunk).to_text() {
            Ok(text) => {
                let _ = self.commands.send(Command::Frame(text));
            }
            Err(e) => warn!(error = %e, "failed to frame audio chunk"),
        }
    }

    /// Ask the server to finish and close the connection.
    ///
    /// Idempotent. Only the first call on an open session emits a stop frame;
    /// a call while still connecting closes the socket as soon as it opens.
    pub fn stop(&self) {
        if self.state.transition(SessionState::Open, SessionState::Closing) {
            let _ = self.commands.send(Command::Stop);
        } else if self
            .state
            .transition(SessionState::Connecting, SessionState::Closing)
        {
            debug!("stop requested before session opened");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.load() == SessionState::Open
    }

    pub fn state(&self) -> SessionState {
        self.state.load()
    }
}

/// Stream of [`SessionEvent`]s for one session. Ends after [`SessionEvent::Closed`].
#[derive(Debug)]
pub struct SessionEvents {
    inner: UnboundedReceiverStream<SessionEvent>,
}

impl SessionEvents {
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.inner.next().await
    }
}

impl Stream for SessionEvents {
    type Item = SessionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

struct SessionDriver {
    url: String,
    config: StreamConfig,
    connect_timeout: Duration,
    state: StateCell,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionDriver {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let connected =
            tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str())).await;
        let ws = match connected {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                self.fail(format!("failed to connect to {}: {}", self.url, e));
                return;
            }
            Err(_) => {
                self.fail(format!(
                    "connection to {} timed out after {}ms",
                    self.url,
                    self.connect_timeout.as_millis()
                ));
                return;
            }
        };
        let (mut sink, mut stream) = ws.split();

        if !self
            .state
            .transition(SessionState::Connecting, SessionState::Open)
        {
            let _ = sink.close().await;
            self.finish();
            return;
        }
        info!(url = self.url.as_str(), "streaming session opened");
        self.emit(SessionEvent::Opened);

        if let Some(frame) = OutboundFrame::config_for(&self.config) {
            if let Err(e) = write_frame(&mut sink, &frame).await {
                self.broken(e);
                self.finish();
                return;
            }
        }

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Frame(text)) => {
                        if let Err(e) = sink.send(Message::text(text)).await {
                            self.broken(connection_error(e));
                            break;
                        }
                    }
                    Some(Command::Stop) => {
                        if let Err(e) = write_frame(&mut sink, &OutboundFrame::Stop).await {
                            debug!(error = %e, "failed to send stop frame");
                        }
                        let _ = sink.close().await;
                        break;
                    }
                    None => {
                        let _ = sink.close().await;
                        break;
                    }
                },
                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => self.dispatch(text.as_str()),
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "server closed streaming session");
                        break;
                    }
                    Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                        Ok(text) => self.dispatch(text),
                        Err(e) => self.emit(SessionEvent::Error(Error::StreamParse(format!(
                            "failed to parse streaming message: binary frame is not UTF-8: {}",
                            e
                        )))),
                    },
                    // Ping, pong and raw frames carry no payload for this protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        self.broken(connection_error(e));
                        break;
                    }
                    None => {
                        self.broken(Error::StreamConnection(
                            "connection closed unexpectedly".to_string(),
                        ));
                        break;
                    }
                },
            }
        }

        self.finish();
    }

    fn dispatch(&self, text: &str) {
        match parse_inbound(text) {
            Ok(Some(InboundMessage::PartialTranscript(p))) => self.emit(SessionEvent::Partial(p)),
            Ok(Some(InboundMessage::FinalTranscript(f))) => self.emit(SessionEvent::Final(f)),
            Ok(Some(InboundMessage::ErrorNotice { message })) => {
                warn!(message = message.as_str(), "streaming service reported an error");
                self.emit(SessionEvent::Error(Error::StreamNotice(message)));
            }
            Ok(Some(InboundMessage::ConfigAck)) => debug!("streaming config acknowledged"),
            Ok(None) => debug!("dropping frame with unknown type"),
            Err(e) => self.emit(SessionEvent::Error(e)),
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The caller may have dropped the event stream; that is not an error.
        let _ = self.events.send(event);
    }

    /// Leave `Open` before reporting a broken connection.
    fn broken(&self, err: Error) {
        self.state.store(SessionState::Closing);
        warn!(url = self.url.as_str(), error = %err, "streaming connection lost");
        self.emit(SessionEvent::Error(err));
    }

    fn fail(&self, message: String) {
        warn!(url = self.url.as_str(), error = message.as_str(), "streaming session failed");
        self.emit(SessionEvent::Error(Error::StreamConnection(message)));
        self.finish();
    }

    fn finish(&self) {
        self.state.store(SessionState::Closed);
        info!(url = self.url.as_str(), "streaming session closed");
        self.emit(SessionEvent::Closed);
    }
}

async fn write_frame<S>(sink: &mut S, frame: &OutboundFrame) -> Result<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let text = frame.to_text()?;
    sink.send(Message::text(text))
        .await
        .map_err(connection_error)
}

fn connection_error(e: tungstenite::Error) -> Error {
    Error::StreamConnection(e.to_string())
}
