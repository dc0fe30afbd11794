//! Theme and Colors
//!
//! The panel palette plus the mapping from a core [`Treatment`] to terminal
//! styling. A terminal cannot scale or filter a sprite, so:
//!
//! - `Outline` draws a plain frame around the sprite
//! - `Glow` draws a thick frame in a hue-rotated glow color
//! - a scale above 1.0 grows the frame by that factor and bolds the sprite cells

use panel_core::{ConnectionStatus, Filter, Treatment};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

// ============================================================================
// Character Palette
// ============================================================================

/// Sprite cells
pub const SPRITE: Color = Color::Rgb(255, 182, 193);

/// Outline frame
pub const OUTLINE: Color = Color::Rgb(120, 120, 120);

/// Hue (degrees) the glow starts from before rotation
pub const GLOW_BASE_HUE: u16 = 200;

// ============================================================================
// UI Colors
// ============================================================================

/// Speaker label
pub const SPEAKER: Color = Color::Magenta;

/// Dialogue text
pub const DIALOGUE: Color = Color::Rgb(230, 230, 230);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Connected
pub const ONLINE_GREEN: Color = Color::Rgb(120, 230, 120);

/// Connecting
pub const CONNECTING_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Disconnected
pub const OFFLINE_RED: Color = Color::Rgb(255, 80, 80);

/// Glow color for a hue rotation, in degrees
pub fn glow_color(hue_rotate: u16) -> Color {
    let hue = f32::from((GLOW_BASE_HUE + hue_rotate % 360) % 360);
    hsv_to_rgb(hue, 0.55, 1.0)
}

/// Convert HSV (hue in degrees, saturation and value in 0..=1) to RGB
fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Color {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match hue {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(channel(r), channel(g), channel(b))
}

/// Frame style around the sprite
pub fn frame_style(treatment: Treatment) -> (BorderType, Style) {
    match treatment.filter {
        Filter::Outline => (BorderType::Plain, Style::default().fg(OUTLINE)),
        Filter::Glow { hue_rotate } => (
            BorderType::Thick,
            Style::default()
                .fg(glow_color(hue_rotate))
                .add_modifier(Modifier::BOLD),
        ),
    }
}

/// Style of the sprite cells
pub fn sprite_style(treatment: Treatment) -> Style {
    let style = Style::default().fg(SPRITE);
    if treatment.is_emphasized() {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Indicator label and color for a connection status
pub fn status_indicator(status: ConnectionStatus) -> (&'static str, Color) {
    match status {
        ConnectionStatus::Connecting => ("● connecting", CONNECTING_YELLOW),
        ConnectionStatus::Open => ("● online", ONLINE_GREEN),
        ConnectionStatus::Closed => ("○ offline", OFFLINE_RED),
    }
}
