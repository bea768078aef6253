//! Real-time progress channel.
//!
//! [`RealtimeClient`] is an explicit handle on one backend origin; there is no
//! process-wide connection cache. [`RealtimeClient::connect`] performs the
//! Engine.IO handshake and joins the default Socket.IO namespace, then hands
//! the socket to a background task which turns frames into
//! [`RealtimeEvent`]s. Dropping the [`RealtimeConnection`] stops the task and
//! closes the socket.
//!
//! WebSocket transport only: no long-polling fallback, no reconnection.

pub mod packet;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use vidpress_core::{AppError, ClientConfig, Percentage, ProgressPayload};

use packet::{EnginePacket, OpenPayload, SocketPacket};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";
const EVENT_BUFFER: usize = 64;
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Event name carrying `{percentage: number}`.
pub const PROGRESS_EVENT: &str = "progress";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// The server accepted the namespace connection (`connect`).
    Connected,
    /// A clamped `progress` event.
    Progress(Percentage),
    /// The channel ended (`disconnect`); no further events follow.
    Disconnected { reason: String },
}

#[derive(Clone, Debug)]
pub struct RealtimeClient {
    endpoint: String,
    connect_timeout: Duration,
}

impl RealtimeClient {
    /// `origin` may use http(s) or ws(s). An origin that already names a
    /// `/socket.io/` path is used as is, apart from the scheme mapping.
    pub fn new(origin: &str) -> Self {
        Self {
            endpoint: socket_endpoint(origin),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.realtime_url).with_connect_timeout(config.connect_timeout())
    }

    /// Bound on the TCP connect plus WebSocket upgrade.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn connect(&self) -> Result<RealtimeConnection, AppError> {
        let (mut ws, _response) = tokio::time::timeout(
            self.connect_timeout,
            tokio_tungstenite::connect_async(self.endpoint.as_str()),
        )
        .await
        .map_err(|_| {
            AppError::Realtime(format!(
                "Timed out connecting to {} after {:?}",
                self.endpoint, self.connect_timeout
            ))
        })?
        .map_err(|e| AppError::Realtime(format!("Failed to connect to {}: {}", self.endpoint, e)))?;

        let open = tokio::time::timeout(HANDSHAKE_TIMEOUT, wait_for_open(&mut ws))
            .await
            .map_err(|_| AppError::Realtime("Timed out waiting for handshake".to_string()))??;

        ws.send(Message::text(packet::connect_frame()))
            .await
            .map_err(|e| AppError::Realtime(format!("Failed to join namespace: {}", e)))?;

        info!(
            endpoint = %self.endpoint,
            sid = %open.sid,
            ping_interval_ms = open.ping_interval,
            "Realtime channel opened"
        );

        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let sid = open.sid.clone();
        let task = tokio::spawn(run_connection(ws, open, events_tx, shutdown_rx));

        Ok(RealtimeConnection {
            sid,
            events: events_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// A live channel. Events are delivered in arrival order.
pub struct RealtimeConnection {
    sid: String,
    events: mpsc::Receiver<RealtimeEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeConnection {
    /// Engine.IO session id assigned by the server.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Next event, or `None` once the channel has ended and been drained.
    pub async fn next_event(&mut self) -> Option<RealtimeEvent> {
        self.events.recv().await
    }

    /// Close the socket and wait for the background task to finish.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RealtimeConnection {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn socket_endpoint(origin: &str) -> String {
    let origin = origin.trim();
    let mapped = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        origin.to_string()
    };

    if mapped.contains("/socket.io/") {
        mapped
    } else {
        format!("{}{}", mapped.trim_end_matches('/'), SOCKET_IO_PATH)
    }
}

async fn wait_for_open(ws: &mut WsStream) -> Result<OpenPayload, AppError> {
    while let Some(frame) = ws.next().await {
        let frame = frame.map_err(|e| AppError::Realtime(format!("Handshake failed: {}", e)))?;
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match packet::decode(text.as_str()) {
            Ok(EnginePacket::Open(open)) => return Ok(open),
            Ok(other) => debug!(packet = ?other, "Ignoring packet before handshake"),
            Err(e) => {
                return Err(AppError::Realtime(format!("Invalid handshake frame: {}", e)));
            }
        }
    }
    Err(AppError::Realtime(
        "Connection closed during handshake".to_string(),
    ))
}

/// Outcome of handling one frame.
enum Flow {
    Continue,
    /// The channel ended; emit `Disconnected` with this reason.
    End(String),
    /// The consumer went away; stop without emitting anything.
    Unsubscribed,
}

async fn run_connection(
    mut ws: WsStream,
    open: OpenPayload,
    events: mpsc::Sender<RealtimeEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // The server pings every ping_interval and gives up after ping_timeout.
    let liveness = Duration::from_millis(open.ping_interval.saturating_add(open.ping_timeout));

    let flow = loop {
        let frame = tokio::select! {
            _ = &mut shutdown => break Flow::Unsubscribed,
            frame = tokio::time::timeout(liveness, ws.next()) => frame,
        };

        let flow = match frame {
            Err(_) => Flow::End("ping timeout".to_string()),
            Ok(None) => Flow::End("transport close".to_string()),
            Ok(Some(Err(e))) => Flow::End(format!("transport error: {}", e)),
            Ok(Some(Ok(Message::Text(text)))) => {
                handle_frame(&mut ws, text.as_str(), &events).await
            }
            Ok(Some(Ok(Message::Close(_)))) => Flow::End("transport close".to_string()),
            Ok(Some(Ok(_))) => Flow::Continue,
        };

        match flow {
            Flow::Continue => {}
            other => break other,
        }
    };

    if let Flow::End(reason) = flow {
        info!(sid = %open.sid, reason = %reason, "Realtime channel disconnected");
        let _ = events.send(RealtimeEvent::Disconnected { reason }).await;
    } else {
        debug!(sid = %open.sid, "Realtime channel unsubscribed");
    }

    let _ = ws.close(None).await;
}

async fn handle_frame(ws: &mut WsStream, text: &str, events: &mpsc::Sender<RealtimeEvent>) -> Flow {
    let decoded = match packet::decode(text) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, frame = %text, "Skipping malformed realtime frame");
            return Flow::Continue;
        }
    };

    let event = match decoded {
        EnginePacket::Ping => {
            if let Err(e) = ws.send(Message::text(packet::PONG_FRAME.to_string())).await {
                return Flow::End(format!("transport error: {}", e));
            }
            return Flow::Continue;
        }
        EnginePacket::Close => return Flow::End("server close".to_string()),
        EnginePacket::Message(SocketPacket::Connect { .. }) => RealtimeEvent::Connected,
        EnginePacket::Message(SocketPacket::Disconnect { .. }) => {
            return Flow::End("io server disconnect".to_string())
        }
        EnginePacket::Message(SocketPacket::ConnectError { payload, .. }) => {
            return Flow::End(format!(
                "connect error: {}",
                payload.map(|p| p.to_string()).unwrap_or_default()
            ))
        }
        EnginePacket::Message(SocketPacket::Event { name, args, .. }) if name == PROGRESS_EVENT => {
            let payload = args
                .into_iter()
                .next()
                .map(serde_json::from_value::<ProgressPayload>);
            match payload {
                Some(Ok(payload)) => RealtimeEvent::Progress(payload.clamped()),
                Some(Err(e)) => {
                    warn!(error = %e, "Ignoring progress event with invalid payload");
                    return Flow::Continue;
                }
                None => {
                    warn!("Ignoring progress event without payload");
                    return Flow::Continue;
                }
            }
        }
        EnginePacket::Message(SocketPacket::Event { name, .. }) => {
            debug!(event = %name, "Ignoring realtime event");
            return Flow::Continue;
        }
        other => {
            debug!(packet = ?other, "Ignoring realtime packet");
            return Flow::Continue;
        }
    };

    match events.send(event).await {
        Ok(()) => Flow::Continue,
        Err(_) => Flow::Unsubscribed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_maps_http_schemes() {
        assert_eq!(
            RealtimeClient::new("http://localhost:5000").endpoint(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            RealtimeClient::new("https://videos.example.com/").endpoint(),
            "wss://videos.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn endpoint_keeps_explicit_socket_path() {
        assert_eq!(
            RealtimeClient::new("wss://push.example.com/socket.io/?EIO=4&transport=websocket")
                .endpoint(),
            "wss://push.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }
}
