//! Main Application
//!
//! The App drives a [`Panel`] from a single-threaded tokio loop. It waits on
//! four sources at once and never sleeps otherwise:
//!
//! 1. Terminal input (quit, skip the reveal, resize)
//! 2. Transport events from the WebSocket task
//! 3. The panel's next timer deadline (typewriter ticks, reconnects)
//! 4. The frame interval, which redraws when the view is dirty
//!
//! After every wake-up the panel clock is advanced to the time elapsed since
//! the App started.

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use panel_core::{
    ConnectionStatus, Panel, PanelConfig, Transport, TransportEvent, TransportEventKind,
    WebSocketTransport,
};

use crate::view::PanelView;

/// Redraw cadence for a dirty view (~60 FPS)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How long to wait for the close request to go out on quit
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Main application state
pub struct App<T: Transport> {
    /// The panel being driven
    panel: Panel<PanelView, T>,
    /// Events from the transport's connection tasks
    events: mpsc::UnboundedReceiver<TransportEvent>,
    /// Zero point of the panel clock
    epoch: Instant,
    /// Is the app still running?
    running: bool,
    /// A live connection was being closed when quitting
    closing: bool,
}

impl App<WebSocketTransport> {
    /// Create an App on the WebSocket transport
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(config: &PanelConfig) -> Self {
        let (transport, events) = WebSocketTransport::new();
        Self::new(config, transport, events)
    }
}

impl<T: Transport> App<T> {
    /// Create an App on any transport and its event receiver
    pub fn new(
        config: &PanelConfig,
        transport: T,
        events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        let view = PanelView::new(config.endpoint.as_str());
        Self {
            panel: Panel::new(config, view, transport),
            events,
            epoch: Instant::now(),
            running: true,
            closing: false,
        }
    }

    /// The panel
    pub fn panel(&self) -> &Panel<PanelView, T> {
        &self.panel
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin connecting
    pub fn start(&mut self) {
        self.panel.start();
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.start();
        self.render(terminal)?;

        while self.running {
            let wakeup = self.next_wakeup();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => warn!(error = %e, "Terminal event error"),
                    None => self.quit(),
                },

                Some(event) = self.events.recv() => self.handle_transport(event),

                () = sleep_until_deadline(wakeup) => {}

                _ = frames.tick() => {
                    if self.panel.renderer().is_dirty() {
                        self.render(terminal)?;
                    }
                }
            }

            self.panel.advance(self.epoch.elapsed());
        }

        if self.closing {
            self.wait_for_close().await;
        }
        Ok(())
    }

    /// Feed a transport event
    ///
    /// The clock is caught up first so timers the event schedules start
    /// from the moment it arrived.
    pub fn handle_transport(&mut self, event: TransportEvent) {
        self.panel.advance(self.epoch.elapsed());
        self.panel.handle_transport(event);
    }

    /// Handle a terminal event
    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(width, height) => {
                debug!(width, height, "Terminal resized");
                self.panel.renderer_mut().mark_dirty();
            }
            _ => {}
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc | KeyCode::Char('q') => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),

            // Skip the rest of the reveal
            KeyCode::Char(' ') | KeyCode::Enter => self.panel.finish_reveal(),

            _ => {}
        }
    }

    fn quit(&mut self) {
        if !self.running {
            return;
        }
        info!("Quit requested");
        self.closing = self.panel.connection().status() != ConnectionStatus::Closed;
        self.panel.shutdown();
        self.running = false;
    }

    /// Give the connection task a moment to send the close request
    async fn wait_for_close(&mut self) {
        let closed = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(event) = self.events.recv().await {
                if matches!(
                    event.kind,
                    TransportEventKind::Closed | TransportEventKind::Error(_)
                ) {
                    break;
                }
            }
        })
        .await;

        if closed.is_err() {
            debug!("Connection did not close within the grace period");
        }
    }

    fn next_wakeup(&self) -> Option<Instant> {
        self.panel.next_deadline().map(|deadline| self.epoch + deadline)
    }

    /// Draw the panel if anything changed
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let revealing = self.panel.typewriter().is_revealing();
        let view = self.panel.renderer();
        terminal.draw(|frame| view.draw(frame, revealing))?;
        self.panel.renderer_mut().mark_clean();
        Ok(())
    }
}

/// Wait until `deadline`, or forever when nothing is scheduled
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use panel_core::test_utils::RecordingTransport;
    use panel_core::{ConfigOverrides, ConnectionId};
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    fn app() -> App<RecordingTransport> {
        let config = PanelConfig::from_overrides(ConfigOverrides {
            connected_text: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();
        App::new(&config, RecordingTransport::new(), rx)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn open(app: &mut App<RecordingTransport>) {
        app.start();
        app.handle_transport(TransportEvent::new(ConnectionId(0), TransportEventKind::Opened));
    }

    #[test]
    fn test_quit_keys() {
        for event in [
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app();
            open(&mut app);

            app.handle_terminal_event(event);

            assert!(!app.is_running());
            assert_eq!(app.panel().transport().closed, vec![ConnectionId(0)]);
        }
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut app = app();
        app.handle_terminal_event(Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }));
        assert!(app.is_running());
    }

    #[test]
    fn test_space_skips_reveal() {
        let mut app = app();
        open(&mut app);
        app.handle_transport(TransportEvent::new(
            ConnectionId(0),
            TransportEventKind::Message(
                r#"{"type":"state","state":"talking","text":"A fairly long sentence"}"#.into(),
            ),
        ));
        assert!(app.panel().typewriter().is_revealing());

        app.handle_terminal_event(key(KeyCode::Char(' '), KeyModifiers::NONE));

        assert_eq!(app.panel().renderer().text(), "A fairly long sentence");
        assert!(!app.panel().typewriter().is_revealing());
    }

    #[test]
    fn test_timers_start_from_arrival_time() {
        let mut app = app();
        open(&mut app);
        let started = Duration::from_secs(5);
        app.epoch = Instant::now().checked_sub(started).unwrap();

        app.handle_transport(TransportEvent::new(
            ConnectionId(0),
            TransportEventKind::Message(r#"{"type":"state","state":"talking","text":"Hi"}"#.into()),
        ));

        let deadline = app.panel().next_deadline().unwrap();
        assert!(deadline > started, "tick scheduled at {deadline:?}");
    }

    #[test]
    fn test_render_clears_dirty_and_resize_marks_it() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();

        app.render(&mut terminal).unwrap();
        assert!(!app.panel().renderer().is_dirty());

        app.handle_terminal_event(Event::Resize(80, 24));
        assert!(app.panel().renderer().is_dirty());
    }
}
