//! Renderer Seam
//!
//! The [`Renderer`] is the only thing that touches the visible surface. It is
//! a set of dumb setters with no scheduling or network knowledge; the panel
//! owns one and passes it to the display state machine and the typewriter.
//!
//! Every setter must be idempotent when called twice with the same value.

use std::path::Path;

use crate::connection::ConnectionStatus;

/// Styling filter applied to the character sprite
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Plain outline, the resting look
    Outline,
    /// Coloured glow with the sprite's hue rotated by `hue_rotate` degrees
    Glow {
        /// Hue rotation in degrees (0-359)
        hue_rotate: u16,
    },
}

/// Complete visual treatment of the sprite
///
/// Applying a treatment replaces the previous one entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Treatment {
    /// Relative size, 1.0 = neutral
    pub scale: f32,
    /// Styling filter
    pub filter: Filter,
}

impl Treatment {
    /// Neutral scale with the default outline
    pub const NEUTRAL: Treatment = Treatment {
        scale: 1.0,
        filter: Filter::Outline,
    };

    /// Whether the sprite is drawn larger than neutral
    pub fn is_emphasized(&self) -> bool {
        self.scale > 1.0
    }
}

impl Default for Treatment {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Side-effecting adapter onto the display surface
pub trait Renderer {
    /// Show `speaker` as the speaker label
    fn set_speaker(&mut self, speaker: &str);

    /// Show the sprite asset at `path`. A missing asset renders as empty.
    fn set_sprite(&mut self, path: &Path);

    /// Apply a visual treatment to the sprite
    fn set_treatment(&mut self, treatment: Treatment);

    /// Append one character to the dialogue text
    fn push_char(&mut self, ch: char);

    /// Remove all dialogue text
    fn clear_text(&mut self);

    /// Show the connection indicator
    fn set_connection_status(&mut self, status: ConnectionStatus);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn set_speaker(&mut self, speaker: &str) {
        (**self).set_speaker(speaker);
    }

    fn set_sprite(&mut self, path: &Path) {
        (**self).set_sprite(path);
    }

    fn set_treatment(&mut self, treatment: Treatment) {
        (**self).set_treatment(treatment);
    }

    fn push_char(&mut self, ch: char) {
        (**self).push_char(ch);
    }

    fn clear_text(&mut self) {
        (**self).clear_text();
    }

    fn set_connection_status(&mut self, status: ConnectionStatus) {
        (**self).set_connection_status(status);
    }
}
