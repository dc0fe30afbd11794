//! DialogueBox Widget
//!
//! A framed text region with the speaker as its title. The line is wrapped
//! to the box width and, when it no longer fits, the tail stays visible so a
//! reveal in progress is always on screen.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Widget};
use textwrap::wrap;

use crate::theme::{DIALOGUE, DIM_GRAY, SPEAKER};

/// Reveal cursor appended while text is still arriving
const CURSOR: char = '_';

/// Speaker label plus dialogue line
pub struct DialogueBox<'a> {
    speaker: Option<&'a str>,
    text: &'a str,
    revealing: bool,
}

impl<'a> DialogueBox<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            speaker: None,
            text,
            revealing: false,
        }
    }

    pub fn speaker(mut self, speaker: Option<&'a str>) -> Self {
        self.speaker = speaker;
        self
    }

    /// Show the reveal cursor after the text
    pub fn revealing(mut self, revealing: bool) -> Self {
        self.revealing = revealing;
        self
    }

    fn wrapped_lines(&self, width: usize) -> Vec<String> {
        let content = if self.revealing {
            format!("{}{CURSOR}", self.text)
        } else {
            self.text.to_string()
        };

        content
            .lines()
            .flat_map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    wrap(line, width)
                        .into_iter()
                        .map(|cow| cow.to_string())
                        .collect()
                }
            })
            .collect()
    }
}

impl Widget for DialogueBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DIM_GRAY));
        if let Some(speaker) = self.speaker {
            block = block.title(Span::styled(
                format!(" {speaker} "),
                Style::default().fg(SPEAKER).add_modifier(Modifier::BOLD),
            ));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.wrapped_lines(inner.width as usize);
        let skip = lines.len().saturating_sub(inner.height as usize);
        let style = Style::default().fg(DIALOGUE);

        for (i, line) in lines.iter().skip(skip).enumerate() {
            let y = inner.y + u16::try_from(i).unwrap_or(u16::MAX);
            buf.set_stringn(inner.x, y, line, inner.width as usize, style);
        }
    }
}
