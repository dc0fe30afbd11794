//! Panel View
//!
//! [`PanelView`] is the terminal [`Renderer`]: it stores what the core asks
//! it to show and draws it on demand. Every setter marks the view dirty; the
//! run loop redraws dirty views on its frame tick.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          ┌────────┐          │
//! │          │ sprite │          │  sprite frame (rest of the screen)
//! │          └────────┘          │
//! ├ Speaker ─────────────────────┤
//! │ dialogue line_               │  dialogue box
//! └──────────────────────────────┘
//!  ● online  ws://host/ws   q quit · space skip   status line
//! ```

use std::path::{Path, PathBuf};

use panel_core::{ConnectionStatus, Renderer, Treatment};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tracing::debug;

use crate::theme::{status_indicator, DIM_GRAY};
use crate::widgets::{DialogueBox, SpriteFrame};

/// Dialogue box height including its border
const DIALOGUE_HEIGHT: u16 = 6;

/// Key hints in the status line
const KEY_HINTS: &str = "q quit · space skip";

/// Read a sprite asset; missing or unreadable assets are an empty sprite
pub fn load_sprite(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Sprite asset unavailable");
            Vec::new()
        }
    }
}

/// Terminal renderer for the panel
#[derive(Debug)]
pub struct PanelView {
    endpoint: String,
    speaker: Option<String>,
    sprite_path: Option<PathBuf>,
    sprite: Vec<String>,
    treatment: Treatment,
    text: String,
    status: ConnectionStatus,
    dirty: bool,
}

impl PanelView {
    /// Create an empty view; `endpoint` is shown in the status line
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            speaker: None,
            sprite_path: None,
            sprite: Vec::new(),
            treatment: Treatment::NEUTRAL,
            text: String::new(),
            status: ConnectionStatus::Closed,
            dirty: true,
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    pub fn sprite_path(&self) -> Option<&Path> {
        self.sprite_path.as_deref()
    }

    pub fn sprite(&self) -> &[String] {
        &self.sprite
    }

    pub fn treatment(&self) -> Treatment {
        self.treatment
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Whether something changed since the last draw
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a redraw (e.g. after a terminal resize)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Record that the current state is on screen
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Draw the whole panel
    pub fn draw(&self, frame: &mut Frame, revealing: bool) {
        let [sprite_area, dialogue_area, status_area] = areas(frame.area());

        frame.render_widget(SpriteFrame::new(&self.sprite, self.treatment), sprite_area);
        frame.render_widget(
            DialogueBox::new(&self.text)
                .speaker(self.speaker.as_deref())
                .revealing(revealing),
            dialogue_area,
        );
        frame.render_widget(self.status_line(), status_area);
    }

    fn status_line(&self) -> Paragraph<'_> {
        let (label, color) = status_indicator(self.status);
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {label}"), Style::default().fg(color)),
            Span::styled(format!("  {}  ", self.endpoint), Style::default().fg(DIM_GRAY)),
            Span::styled(KEY_HINTS, Style::default().fg(DIM_GRAY)),
        ]))
    }
}

/// Sprite, dialogue and status areas of the screen
fn areas(screen: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(DIALOGUE_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(screen)
}

impl Renderer for PanelView {
    fn set_speaker(&mut self, speaker: &str) {
        if self.speaker.as_deref() != Some(speaker) {
            self.speaker = Some(speaker.to_string());
            self.dirty = true;
        }
    }

    fn set_sprite(&mut self, path: &Path) {
        if self.sprite_path.as_deref() == Some(path) {
            return;
        }
        self.sprite = load_sprite(path);
        self.sprite_path = Some(path.to_path_buf());
        self.dirty = true;
    }

    fn set_treatment(&mut self, treatment: Treatment) {
        if self.treatment != treatment {
            self.treatment = treatment;
            self.dirty = true;
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.dirty = true;
    }

    fn clear_text(&mut self) {
        if !self.text.is_empty() {
            self.text.clear();
            self.dirty = true;
        }
    }

    fn set_connection_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            self.status = status;
            self.dirty = true;
        }
    }
}
