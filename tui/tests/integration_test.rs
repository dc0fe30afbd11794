//! Integration Tests for the terminal panel
//!
//! These drive an [`App`] on a recording transport and draw it into a
//! `TestBackend`, checking what actually ends up on screen.
//!
//! # Test Coverage
//!
//! 1. **Shipped assets**: every visual state has a sprite
//! 2. **State flow**: events change sprite, speaker, text and indicator
//! 3. **Loss**: the indicator goes offline while the character stays

use std::path::PathBuf;

use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use panel_core::test_utils::RecordingTransport;
use panel_core::{
    ConfigOverrides, ConnectionId, PanelConfig, TransportEvent, TransportEventKind, VisualState,
};
use panel_tui::view::load_sprite;
use panel_tui::App;

fn asset_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../assets/avatar")
}

fn app() -> App<RecordingTransport> {
    let config = PanelConfig::from_overrides(ConfigOverrides {
        asset_dir: Some(asset_dir()),
        connected_text: Some("Connected.".to_string()),
        ..Default::default()
    })
    .unwrap();
    let (_tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config, RecordingTransport::new(), rx);
    app.start();
    app
}

fn screen(app: &mut App<RecordingTransport>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
    app.render(&mut terminal).unwrap();
    let buf = terminal.backend().buffer();
    (0..buf.area.height)
        .map(|y| {
            (0..buf.area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn event(kind: TransportEventKind) -> TransportEvent {
    TransportEvent::new(ConnectionId(0), kind)
}

// ============================================================================
// Shipped assets
// ============================================================================

#[test]
fn test_every_state_has_a_sprite() {
    for state in VisualState::ALL {
        let path = asset_dir().join(format!("{state}.txt"));
        assert!(!load_sprite(&path).is_empty(), "missing sprite {}", path.display());
    }
}

// ============================================================================
// State flow
// ============================================================================

#[test]
fn test_state_event_reaches_the_screen() {
    let mut app = app();
    app.handle_transport(event(TransportEventKind::Opened));
    app.handle_transport(event(TransportEventKind::Message(
        r#"{"type":"state","state":"talking","text":"Done.","speaker":"Aria"}"#.into(),
    )));
    app.handle_terminal_event(crossterm::event::Event::Key(
        crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Char(' ')),
    ));

    let screen = screen(&mut app);

    assert!(screen.contains(" Aria "), "{screen}");
    assert!(screen.contains("Done."), "{screen}");
    assert!(screen.contains("online"), "{screen}");
    assert!(screen.contains(r"\___/"), "talking sprite expected:\n{screen}");
}

#[test]
fn test_before_connecting_shows_idle_and_connecting() {
    let mut app = app();

    let screen = screen(&mut app);

    assert!(screen.contains("connecting"), "{screen}");
    assert!(screen.contains("o o"), "idle sprite expected:\n{screen}");
}

// ============================================================================
// Loss
// ============================================================================

#[test]
fn test_loss_shows_offline_and_keeps_character() {
    let mut app = app();
    app.handle_transport(event(TransportEventKind::Opened));
    app.handle_transport(event(TransportEventKind::Message(
        r#"{"type":"state","state":"thinking","speaker":"Aria"}"#.into(),
    )));
    app.handle_transport(event(TransportEventKind::Error("reset by peer".into())));

    let screen = screen(&mut app);

    assert!(screen.contains("offline"), "{screen}");
    assert!(screen.contains(" Aria "), "{screen}");
    assert!(app.panel().connection().reconnect_pending());
}
