//! Panel Orchestrator
//!
//! [`Panel`] owns the renderer, the transport, the timer queue and the three
//! state machines, and exposes the entry points a run loop drives:
//!
//! - [`Panel::start`] once at startup
//! - [`Panel::handle_transport`] for every [`TransportEvent`]
//! - [`Panel::advance`] whenever the clock passes [`Panel::next_deadline`]
//!
//! Nothing in here sleeps or spawns; the caller decides what "now" is.

use std::time::Duration;

use tracing::debug;

use crate::config::PanelConfig;
use crate::connection::{
    ConnectionManager, ConnectionSignal, ConnectionStatus, ReconnectDue, Transport,
    TransportEvent,
};
use crate::display::{DisplayState, DisplayStateMachine};
use crate::events::{StateEvent, VisualState};
use crate::renderer::Renderer;
use crate::scheduler::TimerQueue;
use crate::typewriter::{RevealId, Typewriter};

/// Everything the panel schedules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelTimer {
    /// Next typewriter character
    RevealTick(RevealId),
    /// Reconnect after a loss
    Reconnect,
}

impl From<RevealId> for PanelTimer {
    fn from(id: RevealId) -> Self {
        Self::RevealTick(id)
    }
}

impl From<ReconnectDue> for PanelTimer {
    fn from(_: ReconnectDue) -> Self {
        Self::Reconnect
    }
}

/// The presence panel
#[derive(Debug)]
pub struct Panel<R, T> {
    renderer: R,
    transport: T,
    timers: TimerQueue<PanelTimer>,
    display: DisplayStateMachine,
    typewriter: Typewriter,
    connection: ConnectionManager,
    connected_text: String,
}

impl<R: Renderer, T: Transport> Panel<R, T> {
    /// Build a panel and show the idle character, offline
    pub fn new(config: &PanelConfig, mut renderer: R, transport: T) -> Self {
        let mut display = DisplayStateMachine::new(config.asset_dir.clone());
        display.show(VisualState::Idle, &mut renderer);
        renderer.set_connection_status(ConnectionStatus::Closed);

        Self {
            renderer,
            transport,
            timers: TimerQueue::new(),
            display,
            typewriter: Typewriter::new(config.char_delay),
            connection: ConnectionManager::new(config.endpoint.clone(), config.reconnect_delay),
            connected_text: config.connected_text.clone(),
        }
    }

    /// Begin connecting; idempotent
    pub fn start(&mut self) -> bool {
        let started = self.connection.start(&mut self.transport);
        if started {
            self.renderer
                .set_connection_status(ConnectionStatus::Connecting);
        }
        started
    }

    /// Feed one transport event
    pub fn handle_transport(&mut self, event: TransportEvent) {
        let Some(signal) = self.connection.handle(event, &mut self.timers) else {
            return;
        };

        match signal {
            ConnectionSignal::Connected => {
                self.renderer.set_connection_status(ConnectionStatus::Open);
                let greeting =
                    StateEvent::new(VisualState::Idle).with_text(self.connected_text.as_str());
                self.apply(&greeting);
            }
            ConnectionSignal::State(event) => self.apply(&event),
            ConnectionSignal::Disconnected => {
                self.renderer
                    .set_connection_status(ConnectionStatus::Closed);
            }
        }
    }

    /// Run every timer due at or before `now`
    ///
    /// `now` is measured from the same epoch as every earlier call; it is
    /// clamped so the clock never runs backwards.
    pub fn advance(&mut self, now: Duration) {
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                PanelTimer::RevealTick(id) => {
                    self.typewriter
                        .tick(id, &mut self.renderer, &mut self.timers);
                }
                PanelTimer::Reconnect => {
                    if self.connection.reconnect_due(&mut self.transport) {
                        self.renderer
                            .set_connection_status(ConnectionStatus::Connecting);
                    }
                }
            }
        }
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Current time of the panel's clock
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Skip the rest of the current reveal
    pub fn finish_reveal(&mut self) {
        self.typewriter.finish(&mut self.renderer);
    }

    /// Close the connection and stop reconnecting
    pub fn shutdown(&mut self) {
        debug!("Panel shutting down");
        self.connection
            .shutdown(&mut self.transport, &mut self.timers);
        self.renderer
            .set_connection_status(ConnectionStatus::Closed);
    }

    fn apply(&mut self, event: &StateEvent) {
        self.display.apply(
            event,
            &mut self.renderer,
            &mut self.typewriter,
            &mut self.timers,
        );
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably (for surface-only concerns like resizing)
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Last applied state and speaker
    pub fn display_state(&self) -> &DisplayState {
        self.display.state()
    }

    /// The typewriter
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// The connection manager
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }
}
