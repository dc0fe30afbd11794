//! SpriteFrame Widget
//!
//! Draws sprite lines centered in the available area, framed according to
//! the current [`Treatment`].

use panel_core::Treatment;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Widget};
use unicode_width::UnicodeWidthStr;

use crate::theme::{frame_style, sprite_style};

/// The character sprite in its frame
pub struct SpriteFrame<'a> {
    lines: &'a [String],
    treatment: Treatment,
}

impl<'a> SpriteFrame<'a> {
    pub fn new(lines: &'a [String], treatment: Treatment) -> Self {
        Self { lines, treatment }
    }

    /// Width and height of the sprite itself, in cells
    fn sprite_size(&self) -> (u16, u16) {
        let width = self
            .lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.as_str()))
            .max()
            .unwrap_or(0);
        (clamp_u16(width), clamp_u16(self.lines.len()))
    }

    /// Frame rectangle: the sprite scaled by the treatment, plus the border
    fn frame_rect(&self, area: Rect) -> Rect {
        let (width, height) = self.sprite_size();
        let scale = self.treatment.scale.max(1.0);
        let inner_w = scaled(width, scale);
        let inner_h = scaled(height, scale);

        let w = inner_w.saturating_add(2).min(area.width);
        let h = inner_h.saturating_add(2).min(area.height);
        Rect::new(
            area.x + (area.width - w) / 2,
            area.y + (area.height - h) / 2,
            w,
            h,
        )
    }
}

impl Widget for SpriteFrame<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        let rect = self.frame_rect(area);
        let (border_type, border_style) = frame_style(self.treatment);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(border_style);
        let inner = block.inner(rect);
        block.render(rect, buf);

        let (width, height) = self.sprite_size();
        let x = inner.x + inner.width.saturating_sub(width) / 2;
        let y = inner.y + inner.height.saturating_sub(height) / 2;
        let style = sprite_style(self.treatment);

        for (i, line) in self.lines.iter().take(inner.height as usize).enumerate() {
            let row = y + clamp_u16(i);
            if row >= inner.bottom() {
                break;
            }
            buf.set_stringn(x, row, line, (inner.right() - x) as usize, style);
        }
    }
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(n: u16, scale: f32) -> u16 {
    let grown = (f32::from(n) * scale).round().min(f32::from(u16::MAX)) as u16;
    grown.max(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::Filter;
    use pretty_assertions::assert_eq;

    fn sprite() -> Vec<String> {
        vec![" o o ".to_string(), "  ^  ".to_string(), " \\_/ ".to_string()]
    }

    #[test]
    fn test_frame_is_centered() {
        let lines = sprite();
        let frame = SpriteFrame::new(&lines, Treatment::NEUTRAL);

        assert_eq!(frame.frame_rect(Rect::new(0, 0, 21, 11)), Rect::new(7, 3, 7, 5));
    }

    #[test]
    fn test_emphasis_grows_the_frame() {
        let lines: Vec<String> = (0..10).map(|_| "x".repeat(20)).collect();
        let neutral = SpriteFrame::new(&lines, Treatment::NEUTRAL).frame_rect(Rect::new(0, 0, 80, 40));
        let talking = SpriteFrame::new(
            &lines,
            Treatment {
                scale: 1.1,
                filter: Filter::Outline,
            },
        )
        .frame_rect(Rect::new(0, 0, 80, 40));

        assert_eq!((neutral.width, neutral.height), (22, 12));
        assert_eq!((talking.width, talking.height), (24, 13));
    }

    #[test]
    fn test_sprite_cells_are_drawn() {
        let lines = sprite();
        let area = Rect::new(0, 0, 9, 7);
        let mut buf = Buffer::empty(area);

        SpriteFrame::new(&lines, Treatment::NEUTRAL).render(area, &mut buf);

        let row: String = (0..area.width).map(|x| buf[(x, 3)].symbol().to_string()).collect();
        assert!(row.contains("^"), "row was {row:?}");
    }

    #[test]
    fn test_empty_sprite_draws_only_frame() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);

        SpriteFrame::new(&[], Treatment::NEUTRAL).render(area, &mut buf);

        assert_eq!(buf[(4, 1)].symbol(), "┌");
    }
}
