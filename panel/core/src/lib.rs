//! Panel Core - Headless Presence Panel
//!
//! This crate holds everything a presence panel does except drawing pixels:
//! it keeps a WebSocket connection to an event source alive, decodes
//! `state` messages and turns them into a character's sprite, treatment,
//! speaker label and typewriter-revealed dialogue line.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Run loop (tui)                       │
//! │   transport events ──┐      timer deadlines ──┐              │
//! └──────────────────────┼────────────────────────┼──────────────┘
//!                        ▼                        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Panel                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │ Connection   │──▶│ Display      │──▶│ Typewriter       │  │
//! │  │ Manager      │   │ State Machine│   │ (RevealTask)     │  │
//! │  └──────┬───────┘   └──────┬───────┘   └────────┬─────────┘  │
//! │         │                  │     TimerQueue     │            │
//! │         ▼                  ▼                    ▼            │
//! │     Transport          Renderer ◀───────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Panel`]: owns the state machines, renderer, transport and timers
//! - [`Renderer`]: what a display surface implements
//! - [`Transport`]: what a network layer implements
//! - [`TimerQueue`]: the scheduler, driven by a real or simulated clock
//! - [`PanelConfig`]: layered configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use panel_core::{load_config, ConfigOverrides, Panel, WebSocketTransport};
//!
//! let config = load_config(None, ConfigOverrides::from_env(), ConfigOverrides::default())?;
//! let (transport, mut events) = WebSocketTransport::new();
//! let mut panel = Panel::new(&config, my_renderer, transport);
//! panel.start();
//!
//! loop {
//!     tokio::select! {
//!         Some(event) = events.recv() => panel.handle_transport(event),
//!         _ = sleep_until_next_deadline(&panel) => panel.advance(clock.elapsed()),
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`events`]: wire format and decoding
//! - [`scheduler`]: scheduler trait and timer queue
//! - [`renderer`]: renderer trait and visual treatments
//! - [`typewriter`]: paced, preemptible text reveal
//! - [`display`]: state → sprite/treatment mapping
//! - [`connection`]: connection lifecycle and reconnects
//! - [`panel`]: the orchestrator
//! - [`config`]: configuration loading
//! - `transport`: WebSocket transport (feature `websocket`)
//! - [`test_utils`]: recording renderer and transport
//!
//! # No TUI Dependencies
//!
//! This crate has no dependency on ratatui, crossterm, or any other UI
//! framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connection;
pub mod display;
pub mod events;
pub mod panel;
pub mod renderer;
pub mod scheduler;
pub mod test_utils;
#[cfg(feature = "websocket")]
pub mod transport;
pub mod typewriter;

// Re-exports for convenience
pub use config::{
    default_config_path, endpoint_from_origin, load_config, ConfigError, ConfigOverrides,
    PanelConfig, PanelToml,
};
pub use connection::{
    ConnectionId, ConnectionManager, ConnectionSignal, ConnectionStatus, Transport,
    TransportEvent, TransportEventKind, DEFAULT_RECONNECT_DELAY,
};
pub use display::{DisplayState, DisplayStateMachine};
pub use events::{DecodeError, InboundMessage, StateEvent, StateField, VisualState};
pub use panel::{Panel, PanelTimer};
pub use renderer::{Filter, Renderer, Treatment};
pub use scheduler::{Scheduler, TimerHandle, TimerQueue};
pub use typewriter::{RevealId, Typewriter, DEFAULT_CHAR_DELAY};

#[cfg(feature = "websocket")]
pub use transport::{TransportError, WebSocketTransport};
