//! Typewriter Controller
//!
//! Reveals a line into the [`Renderer`] one character per tick instead of
//! all at once. Each reveal is a [`RevealTask`] identified by a [`RevealId`];
//! the pending tick carries that id back through the [`Scheduler`].
//!
//! Only one task is live at a time. Starting a new reveal clears the text and
//! marks the previous task dead. A tick for a dead or superseded task is
//! dropped without output, so an old line can never interleave with a new
//! one. Characters the old task already revealed stay cleared; nothing is
//! rolled back character by character.

use std::time::Duration;

use tracing::{debug, trace};

use crate::renderer::Renderer;
use crate::scheduler::Scheduler;

/// Default pacing between revealed characters
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(30);

/// Identity of one reveal, used as its liveness token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevealId(u64);

/// One in-progress reveal
#[derive(Debug)]
struct RevealTask {
    id: RevealId,
    chars: Vec<char>,
    cursor: usize,
    live: bool,
}

impl RevealTask {
    fn remaining(&self) -> &[char] {
        &self.chars[self.cursor..]
    }
}

/// Paced, preemptible text reveal
#[derive(Debug)]
pub struct Typewriter {
    char_delay: Duration,
    current: Option<RevealTask>,
    next_id: u64,
}

impl Typewriter {
    /// Create a typewriter revealing one character every `char_delay`
    pub fn new(char_delay: Duration) -> Self {
        Self {
            char_delay,
            current: None,
            next_id: 0,
        }
    }

    /// Pacing between characters
    pub fn char_delay(&self) -> Duration {
        self.char_delay
    }

    /// Start revealing `text`, superseding any reveal in progress
    ///
    /// The displayed text is cleared and the first character is written
    /// immediately; the rest follow one per tick.
    pub fn reveal<R, S>(&mut self, text: &str, renderer: &mut R, scheduler: &mut S) -> RevealId
    where
        R: Renderer + ?Sized,
        S: Scheduler + ?Sized,
        S::Task: From<RevealId>,
    {
        if let Some(previous) = self.current.as_mut() {
            if previous.live {
                debug!(
                    revealed = previous.cursor,
                    total = previous.chars.len(),
                    "Superseding reveal in progress"
                );
            }
            previous.live = false;
        }

        let id = RevealId(self.next_id);
        self.next_id += 1;

        let chars: Vec<char> = text.chars().collect();
        trace!(?id, len = chars.len(), "Starting reveal");

        renderer.clear_text();
        self.current = Some(RevealTask {
            id,
            live: !chars.is_empty(),
            chars,
            cursor: 0,
        });

        self.tick(id, renderer, scheduler);
        id
    }

    /// Advance the reveal identified by `id` by one character
    ///
    /// A tick for a task that is no longer live is a no-op.
    pub fn tick<R, S>(&mut self, id: RevealId, renderer: &mut R, scheduler: &mut S)
    where
        R: Renderer + ?Sized,
        S: Scheduler + ?Sized,
        S::Task: From<RevealId>,
    {
        let Some(task) = self.current.as_mut().filter(|t| t.id == id && t.live) else {
            trace!(?id, "Dropping tick for a dead reveal");
            return;
        };

        if let Some(&ch) = task.remaining().first() {
            renderer.push_char(ch);
            task.cursor += 1;
        }

        if task.remaining().is_empty() {
            task.live = false;
            trace!(?id, "Reveal complete");
        } else {
            scheduler.schedule(self.char_delay, id.into());
        }
    }

    /// Write the rest of the live reveal at once
    ///
    /// The already scheduled tick is left in place and dropped when it fires.
    pub fn finish<R>(&mut self, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        let Some(task) = self.current.as_mut().filter(|t| t.live) else {
            return;
        };

        for &ch in task.remaining() {
            renderer.push_char(ch);
        }
        task.cursor = task.chars.len();
        task.live = false;
        debug!(id = ?task.id, "Reveal finished early");
    }

    /// Whether a reveal is still in progress
    pub fn is_revealing(&self) -> bool {
        self.current.as_ref().is_some_and(|t| t.live)
    }

    /// Id of the most recent reveal
    pub fn current_id(&self) -> Option<RevealId> {
        self.current.as_ref().map(|t| t.id)
    }

    /// Text of the most recent reveal written so far
    pub fn revealed(&self) -> String {
        self.current
            .as_ref()
            .map(|t| t.chars[..t.cursor].iter().collect())
            .unwrap_or_default()
    }

    /// `(revealed, total)` characters of the most recent reveal
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.current.as_ref().map(|t| (t.cursor, t.chars.len()))
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TimerQueue;
    use crate::test_utils::RecordingRenderer;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Advance the clock, feeding every due tick back into the typewriter
    fn run_until(
        typewriter: &mut Typewriter,
        renderer: &mut RecordingRenderer,
        timers: &mut TimerQueue<RevealId>,
        until: Duration,
    ) {
        while let Some(id) = timers.pop_due(until) {
            typewriter.tick(id, renderer, timers);
        }
    }

    #[test]
    fn test_reveal_is_paced_one_char_per_tick() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        let mut timers = TimerQueue::new();

        typewriter.reveal("Hello", &mut renderer, &mut timers);
        assert_eq!(renderer.text, "H");

        run_until(&mut typewriter, &mut renderer, &mut timers, ms(29));
        assert_eq!(renderer.text, "H");

        run_until(&mut typewriter, &mut renderer, &mut timers, ms(30));
        assert_eq!(renderer.text, "He");

        run_until(&mut typewriter, &mut renderer, &mut timers, ms(90));
        assert_eq!(renderer.text, "Hell");
        assert_eq!(typewriter.revealed(), "Hell");
        assert!(typewriter.is_revealing());

        run_until(&mut typewriter, &mut renderer, &mut timers, ms(120));
        assert_eq!(renderer.text, "Hello");
        assert!(!typewriter.is_revealing());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_reveal_clears_previous_text() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        renderer.text = "old line".to_string();
        let mut timers: TimerQueue<RevealId> = TimerQueue::new();

        typewriter.reveal("new", &mut renderer, &mut timers);
        assert_eq!(renderer.text, "n");
        assert_eq!(renderer.clears, 1);
    }

    #[test]
    fn test_new_reveal_supersedes_old_one() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        let mut timers = TimerQueue::new();

        typewriter.reveal("Analyzing...", &mut renderer, &mut timers);
        run_until(&mut typewriter, &mut renderer, &mut timers, ms(60));
        assert_eq!(renderer.text, "Ana");

        typewriter.reveal("Done.", &mut renderer, &mut timers);
        run_until(&mut typewriter, &mut renderer, &mut timers, ms(10_000));

        assert_eq!(renderer.text, "Done.");
        assert!(timers.is_empty());
    }

    #[test]
    fn test_stale_tick_produces_no_output() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        let mut timers: TimerQueue<RevealId> = TimerQueue::new();

        let old = typewriter.reveal("abc", &mut renderer, &mut timers);
        typewriter.reveal("xyz", &mut renderer, &mut timers);
        let before = renderer.text.clone();

        typewriter.tick(old, &mut renderer, &mut timers);
        typewriter.tick(old, &mut renderer, &mut timers);

        assert_eq!(renderer.text, before);
    }

    #[test]
    fn test_reveal_counts_unicode_scalars() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        let mut timers = TimerQueue::new();

        typewriter.reveal("Привет", &mut renderer, &mut timers);
        assert_eq!(renderer.text, "П");
        assert_eq!(typewriter.progress(), Some((1, 6)));

        run_until(&mut typewriter, &mut renderer, &mut timers, ms(150));
        assert_eq!(renderer.text, "Привет");
    }

    #[test]
    fn test_empty_reveal_just_clears() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        renderer.text = "keep?".to_string();
        let mut timers: TimerQueue<RevealId> = TimerQueue::new();

        typewriter.reveal("", &mut renderer, &mut timers);

        assert_eq!(renderer.text, "");
        assert!(!typewriter.is_revealing());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_finish_writes_remainder_and_pending_tick_is_dropped() {
        let mut typewriter = Typewriter::new(ms(30));
        let mut renderer = RecordingRenderer::new();
        let mut timers = TimerQueue::new();

        typewriter.reveal("Skip me", &mut renderer, &mut timers);
        typewriter.finish(&mut renderer);
        assert_eq!(renderer.text, "Skip me");
        assert!(!typewriter.is_revealing());

        run_until(&mut typewriter, &mut renderer, &mut timers, ms(1000));
        assert_eq!(renderer.text, "Skip me");
    }

    #[test]
    fn test_finish_without_reveal_is_noop() {
        let mut typewriter = Typewriter::default();
        let mut renderer = RecordingRenderer::new();

        typewriter.finish(&mut renderer);

        assert_eq!(renderer.text, "");
        assert_eq!(typewriter.char_delay(), DEFAULT_CHAR_DELAY);
    }
}
