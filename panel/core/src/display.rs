//! Display State Machine
//!
//! Translates a [`StateEvent`] into renderer and typewriter operations.
//!
//! The machine is flat and unrestricted: any state may follow any other. The
//! server is the only driver of transitions; the panel validates membership
//! of the state value, never the legality of a transition.
//!
//! | State      | Sprite             | Treatment                  |
//! |------------|--------------------|----------------------------|
//! | `idle`     | `<assets>/idle`    | outline, neutral scale     |
//! | `talking`  | `<assets>/talking` | outline, scaled up         |
//! | `thinking` | `<assets>/thinking`| glow with rotated hue      |

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::events::{StateEvent, StateField, VisualState};
use crate::renderer::{Filter, Renderer, Treatment};
use crate::scheduler::Scheduler;
use crate::typewriter::{RevealId, Typewriter};

/// File extension of per-state sprite assets
pub const SPRITE_EXTENSION: &str = "txt";

/// Scale applied while talking
pub const TALKING_SCALE: f32 = 1.1;

/// Hue rotation of the thinking glow, in degrees
pub const THINKING_HUE_ROTATE: u16 = 90;

/// Visual treatment for a state
pub fn treatment_for(state: VisualState) -> Treatment {
    match state {
        VisualState::Idle => Treatment::NEUTRAL,
        VisualState::Talking => Treatment {
            scale: TALKING_SCALE,
            filter: Filter::Outline,
        },
        VisualState::Thinking => Treatment {
            scale: 1.0,
            filter: Filter::Glow {
                hue_rotate: THINKING_HUE_ROTATE,
            },
        },
    }
}

/// Sprite asset path for a state
pub fn sprite_path(asset_dir: &Path, state: VisualState) -> PathBuf {
    asset_dir.join(format!("{}.{SPRITE_EXTENSION}", state.as_str()))
}

/// What the panel currently shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Last applied visual state
    pub visual: Option<VisualState>,
    /// Last applied speaker label
    pub speaker: Option<String>,
}

/// Applies state-change events to the renderer
#[derive(Debug)]
pub struct DisplayStateMachine {
    asset_dir: PathBuf,
    state: DisplayState,
}

impl DisplayStateMachine {
    /// Create a machine loading sprites from `asset_dir`
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            state: DisplayState::default(),
        }
    }

    /// Current display state
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Directory sprites are loaded from
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Apply one event
    ///
    /// 1. A non-empty speaker replaces the label.
    /// 2. A known state replaces sprite and treatment; an unknown or missing
    ///    one leaves them untouched.
    /// 3. Non-empty text starts a new reveal; absent text leaves the current
    ///    text on screen.
    pub fn apply<R, S>(
        &mut self,
        event: &StateEvent,
        renderer: &mut R,
        typewriter: &mut Typewriter,
        scheduler: &mut S,
    ) where
        R: Renderer + ?Sized,
        S: Scheduler + ?Sized,
        S::Task: From<RevealId>,
    {
        if let Some(speaker) = event.speaker() {
            renderer.set_speaker(speaker);
            self.state.speaker = Some(speaker.to_string());
        }

        match &event.state {
            StateField::Known(state) => self.show(*state, renderer),
            StateField::Unknown(name) => {
                warn!(state = %name, "Ignoring unknown state value");
            }
            StateField::Missing => {
                warn!("State event without a state value");
            }
        }

        if let Some(text) = event.text() {
            typewriter.reveal(text, renderer, scheduler);
        }
    }

    /// Switch sprite and treatment to `state`
    pub fn show<R: Renderer + ?Sized>(&mut self, state: VisualState, renderer: &mut R) {
        debug!(%state, "Applying visual state");
        renderer.set_sprite(&sprite_path(&self.asset_dir, state));
        renderer.set_treatment(treatment_for(state));
        self.state.visual = Some(state);
    }
}
