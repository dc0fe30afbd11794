//! Connection Manager
//!
//! Owns the lifetime of the single transport connection: connect, receive,
//! detect loss, and reconnect after a fixed delay, forever.
//!
//! The manager is sans-IO. It asks a [`Transport`] to open or close
//! connections and is fed back [`TransportEvent`]s tagged with the
//! [`ConnectionId`] they belong to. Every reconnect uses a fresh id, so
//! events from a replaced connection are recognised and dropped.
//!
//! # Loss handling
//!
//! An error and a close are treated the same. The first loss signal for the
//! live connection marks it closed and arms exactly one reconnect timer;
//! any further loss signals for the same connection are ignored. There is no
//! backoff growth and no retry limit: offline is a transient state.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, trace, warn};
use url::Url;

use crate::events::{self, InboundMessage, StateEvent};
use crate::scheduler::{Scheduler, TimerHandle};

/// Default delay before reconnecting after a loss
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Identity of one connection attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle status of the live connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Attempt in flight
    Connecting,
    /// Connected and receiving
    Open,
    /// Lost, closed, or never started
    Closed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Open => "online",
            Self::Closed => "offline",
        };
        f.write_str(s)
    }
}

/// What happened on a connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEventKind {
    /// Handshake completed
    Opened,
    /// A text payload arrived
    Message(String),
    /// The connection failed (including failing to connect)
    Error(String),
    /// The connection closed
    Closed,
}

/// A transport event for one connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportEvent {
    /// Connection the event belongs to
    pub conn: ConnectionId,
    /// What happened
    pub kind: TransportEventKind,
}

impl TransportEvent {
    /// Create an event
    pub fn new(conn: ConnectionId, kind: TransportEventKind) -> Self {
        Self { conn, kind }
    }
}

/// Opens and closes connections on behalf of the manager
///
/// Both calls must return immediately; results are reported later as
/// [`TransportEvent`]s.
pub trait Transport {
    /// Start connecting to `endpoint` as connection `conn`
    fn open(&mut self, conn: ConnectionId, endpoint: &Url);

    /// Close connection `conn` if it is still alive
    fn close(&mut self, conn: ConnectionId);
}

/// Timer payload asking the manager to reconnect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectDue;

/// What the manager wants its owner to do after an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionSignal {
    /// The connection opened
    Connected,
    /// A state-change event arrived
    State(StateEvent),
    /// The connection was lost; a reconnect is scheduled
    Disconnected,
}

#[derive(Clone, Copy, Debug)]
struct Connection {
    id: ConnectionId,
    status: ConnectionStatus,
}

/// Keeps one connection alive
#[derive(Debug)]
pub struct ConnectionManager {
    endpoint: Url,
    reconnect_delay: Duration,
    current: Option<Connection>,
    next_id: u64,
    reconnect: Option<TimerHandle>,
    shut_down: bool,
}

impl ConnectionManager {
    /// Create a manager for `endpoint`
    pub fn new(endpoint: Url, reconnect_delay: Duration) -> Self {
        Self {
            endpoint,
            reconnect_delay,
            current: None,
            next_id: 0,
            reconnect: None,
            shut_down: false,
        }
    }

    /// Endpoint connections are opened to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Status of the live connection
    pub fn status(&self) -> ConnectionStatus {
        self.current
            .map_or(ConnectionStatus::Closed, |c| c.status)
    }

    /// Id of the live (or last) connection
    pub fn current_id(&self) -> Option<ConnectionId> {
        self.current.map(|c| c.id)
    }

    /// Number of connection attempts made so far
    pub fn attempts(&self) -> u64 {
        self.next_id
    }

    /// Whether a reconnect timer is armed
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect.is_some()
    }

    /// Whether [`ConnectionManager::shutdown`] was called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Begin connecting
    ///
    /// No-op while a connection is connecting or open, while a reconnect is
    /// pending, or after shutdown. Returns whether an attempt was started.
    pub fn start<T: Transport + ?Sized>(&mut self, transport: &mut T) -> bool {
        if self.shut_down {
            debug!("Not connecting: shut down");
            return false;
        }
        if self.reconnect.is_some() {
            debug!("Not connecting: reconnect already scheduled");
            return false;
        }
        if self.status() != ConnectionStatus::Closed {
            trace!(status = %self.status(), "Not connecting: already started");
            return false;
        }

        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.current = Some(Connection {
            id,
            status: ConnectionStatus::Connecting,
        });

        info!(conn = %id, endpoint = %self.endpoint, "Connecting");
        transport.open(id, &self.endpoint);
        true
    }

    /// The reconnect timer fired: connect again
    pub fn reconnect_due<T: Transport + ?Sized>(&mut self, transport: &mut T) -> bool {
        if self.reconnect.take().is_none() {
            trace!("Ignoring cancelled reconnect timer");
            return false;
        }
        self.start(transport)
    }

    /// Process one transport event
    ///
    /// Never fails: undecodable payloads and unknown message kinds are logged
    /// and dropped without touching the connection.
    pub fn handle<S>(&mut self, event: TransportEvent, scheduler: &mut S) -> Option<ConnectionSignal>
    where
        S: Scheduler + ?Sized,
        S::Task: From<ReconnectDue>,
    {
        let Some(current) = self.current.filter(|c| c.id == event.conn) else {
            trace!(conn = %event.conn, "Dropping event from a replaced connection");
            return None;
        };

        match event.kind {
            TransportEventKind::Opened => {
                if current.status != ConnectionStatus::Connecting {
                    return None;
                }
                self.set_status(ConnectionStatus::Open);
                if let Some(handle) = self.reconnect.take() {
                    scheduler.cancel(handle);
                }
                info!(conn = %current.id, "Connected");
                Some(ConnectionSignal::Connected)
            }

            TransportEventKind::Message(payload) => {
                if current.status == ConnectionStatus::Closed {
                    return None;
                }
                match events::decode(&payload) {
                    Ok(InboundMessage::State(event)) => Some(ConnectionSignal::State(event)),
                    Ok(InboundMessage::Other { kind }) => {
                        debug!(conn = %current.id, kind = ?kind, "Ignoring message");
                        None
                    }
                    Err(e) => {
                        warn!(conn = %current.id, error = %e, "Dropping undecodable message");
                        None
                    }
                }
            }

            TransportEventKind::Error(reason) => {
                warn!(conn = %current.id, error = %reason, "Connection error");
                self.on_loss(current, scheduler)
            }

            TransportEventKind::Closed => {
                info!(conn = %current.id, "Connection closed");
                self.on_loss(current, scheduler)
            }
        }
    }

    /// Stop for good: cancel any pending reconnect and close the connection
    pub fn shutdown<T, S>(&mut self, transport: &mut T, scheduler: &mut S)
    where
        T: Transport + ?Sized,
        S: Scheduler + ?Sized,
    {
        self.shut_down = true;
        if let Some(handle) = self.reconnect.take() {
            scheduler.cancel(handle);
        }
        if let Some(current) = self.current {
            if current.status != ConnectionStatus::Closed {
                info!(conn = %current.id, "Closing connection");
                transport.close(current.id);
                self.set_status(ConnectionStatus::Closed);
            }
        }
    }

    fn on_loss<S>(&mut self, current: Connection, scheduler: &mut S) -> Option<ConnectionSignal>
    where
        S: Scheduler + ?Sized,
        S::Task: From<ReconnectDue>,
    {
        if current.status == ConnectionStatus::Closed {
            trace!(conn = %current.id, "Loss already handled");
            return None;
        }
        self.set_status(ConnectionStatus::Closed);

        if self.shut_down {
            return None;
        }

        if self.reconnect.is_none() {
            self.reconnect = Some(scheduler.schedule(self.reconnect_delay, ReconnectDue.into()));
            info!(
                conn = %current.id,
                delay_ms = u64::try_from(self.reconnect_delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnect scheduled"
            );
        }
        Some(ConnectionSignal::Disconnected)
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if let Some(current) = self.current.as_mut() {
            current.status = status;
        }
    }
}
