//! Test Utilities
//!
//! In-memory [`Renderer`] and [`Transport`] implementations that record what
//! the panel asked of them. Used by the unit tests, the scenario tests under
//! `tests/`, and by surfaces that want to test their own wiring.

use std::path::{Path, PathBuf};

use url::Url;

use crate::connection::{ConnectionId, ConnectionStatus, Transport};
use crate::renderer::{Renderer, Treatment};

/// One renderer call, in order
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    /// `set_speaker`
    Speaker(String),
    /// `set_sprite`
    Sprite(PathBuf),
    /// `set_treatment`
    Treatment(Treatment),
    /// `push_char`
    Char(char),
    /// `clear_text`
    Clear,
    /// `set_connection_status`
    Status(ConnectionStatus),
}

/// Renderer that keeps the resulting surface state plus a call log
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Speaker label
    pub speaker: Option<String>,
    /// Sprite path
    pub sprite: Option<PathBuf>,
    /// Sprite treatment
    pub treatment: Option<Treatment>,
    /// Dialogue text
    pub text: String,
    /// Connection indicator
    pub status: Option<ConnectionStatus>,
    /// Number of `clear_text` calls
    pub clears: usize,
    /// Every call, in order
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made after the first `since` calls
    pub fn calls_since(&self, since: usize) -> &[RenderCall] {
        &self.calls[since.min(self.calls.len())..]
    }

    /// Whether any call other than a connection status update was made after `since`
    pub fn surface_changed_since(&self, since: usize) -> bool {
        self.calls_since(since)
            .iter()
            .any(|call| !matches!(call, RenderCall::Status(_)))
    }
}

impl Renderer for RecordingRenderer {
    fn set_speaker(&mut self, speaker: &str) {
        self.speaker = Some(speaker.to_string());
        self.calls.push(RenderCall::Speaker(speaker.to_string()));
    }

    fn set_sprite(&mut self, path: &Path) {
        self.sprite = Some(path.to_path_buf());
        self.calls.push(RenderCall::Sprite(path.to_path_buf()));
    }

    fn set_treatment(&mut self, treatment: Treatment) {
        self.treatment = Some(treatment);
        self.calls.push(RenderCall::Treatment(treatment));
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.calls.push(RenderCall::Char(ch));
    }

    fn clear_text(&mut self) {
        self.text.clear();
        self.clears += 1;
        self.calls.push(RenderCall::Clear);
    }

    fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.status = Some(status);
        self.calls.push(RenderCall::Status(status));
    }
}

/// Transport that records open/close requests instead of connecting
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Every `open` call, in order
    pub opened: Vec<(ConnectionId, Url)>,
    /// Every `close` call, in order
    pub closed: Vec<ConnectionId>,
}

impl RecordingTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the most recent `open` call
    pub fn last_opened(&self) -> Option<ConnectionId> {
        self.opened.last().map(|(id, _)| *id)
    }
}

impl Transport for RecordingTransport {
    fn open(&mut self, conn: ConnectionId, endpoint: &Url) {
        self.opened.push((conn, endpoint.clone()));
    }

    fn close(&mut self, conn: ConnectionId) {
        self.closed.push(conn);
    }
}
