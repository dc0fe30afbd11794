//! WebSocket transport
//!
//! Every [`Transport::open`] spawns a task that connects, forwards frames as
//! [`TransportEvent`]s and reports exactly one terminal event (`Closed` or
//! `Error`) when it ends. [`Transport::close`] signals the task through a
//! oneshot; the task sends [`CLOSE_REQUEST`] and closes the socket.

use std::collections::HashMap;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};
use url::Url;

use super::TransportError;
use crate::connection::{ConnectionId, Transport, TransportEvent, TransportEventKind};

/// Text frame asking the server to close the connection
pub const CLOSE_REQUEST: &str = "close";

/// Tokio-backed WebSocket transport
#[derive(Debug)]
pub struct WebSocketTransport {
    events: mpsc::UnboundedSender<TransportEvent>,
    live: HashMap<ConnectionId, oneshot::Sender<()>>,
}

impl WebSocketTransport {
    /// Create a transport and the receiver its events arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let transport = Self {
            events,
            live: HashMap::new(),
        };
        (transport, rx)
    }
}

impl Transport for WebSocketTransport {
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    fn open(&mut self, conn: ConnectionId, endpoint: &Url) {
        // Forget tasks that already ended.
        self.live.retain(|_, tx| !tx.is_closed());

        let (close_tx, close_rx) = oneshot::channel();
        self.live.insert(conn, close_tx);

        let events = self.events.clone();
        let endpoint = endpoint.to_string();
        tokio::spawn(async move {
            let kind = match run_connection(conn, &endpoint, &events, close_rx).await {
                Ok(()) => TransportEventKind::Closed,
                Err(e) => TransportEventKind::Error(e.to_string()),
            };
            trace!(%conn, ?kind, "Connection task finished");
            // Receiver gone means the panel is gone; nothing to report to.
            let _ = events.send(TransportEvent::new(conn, kind));
        });
    }

    fn close(&mut self, conn: ConnectionId) {
        if let Some(tx) = self.live.remove(&conn) {
            let _ = tx.send(());
        }
    }
}

async fn run_connection(
    conn: ConnectionId,
    endpoint: &str,
    events: &mpsc::UnboundedSender<TransportEvent>,
    mut close_rx: oneshot::Receiver<()>,
) -> Result<(), TransportError> {
    let (stream, _response) = tokio::select! {
        result = connect_async(endpoint) => result.map_err(TransportError::ConnectionFailed)?,
        _ = &mut close_rx => {
            debug!(%conn, "Closed before the handshake completed");
            return Ok(());
        }
    };

    debug!(%conn, endpoint, "WebSocket handshake complete");
    let _ = events.send(TransportEvent::new(conn, TransportEventKind::Opened));

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = &mut close_rx => {
                write
                    .send(Message::Text(CLOSE_REQUEST.to_string()))
                    .await
                    .map_err(TransportError::SendFailed)?;
                write.close().await.map_err(TransportError::SendFailed)?;
                return Ok(());
            }

            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::new(conn, TransportEventKind::Message(text)));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        let _ = events.send(TransportEvent::new(conn, TransportEventKind::Message(text)));
                    }
                    Err(_) => warn!(%conn, "Dropping binary frame that is not UTF-8"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(%conn, ?frame, "Server closed the connection");
                    return Ok(());
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e)),
                None => return Ok(()),
            }
        }
    }
}
