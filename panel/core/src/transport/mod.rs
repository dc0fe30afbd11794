//! Transport Layer
//!
//! Real-network implementation of the [`Transport`](crate::connection::Transport)
//! seam. The connection manager decides *when* to connect; a transport only
//! knows *how*, and reports back through a channel of
//! [`TransportEvent`](crate::connection::TransportEvent)s.
//!
//! - [`WebSocketTransport`]: one tokio task per connection over
//!   `tokio-tungstenite`

mod websocket;

pub use websocket::{WebSocketTransport, CLOSE_REQUEST};

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised inside a connection task
///
/// These never reach the caller of [`Transport`](crate::connection::Transport);
/// they are rendered into a
/// [`TransportEventKind::Error`](crate::connection::TransportEventKind::Error).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting or the WebSocket handshake failed
    #[error("connection failed: {0}")]
    ConnectionFailed(#[source] tungstenite::Error),

    /// Writing a frame failed
    #[error("send failed: {0}")]
    SendFailed(#[source] tungstenite::Error),

    /// Reading a frame failed
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] tungstenite::Error),
}
