//! Widgets
//!
//! - [`SpriteFrame`]: the character sprite inside its treatment frame
//! - [`DialogueBox`]: speaker label plus the wrapped dialogue line

mod dialogue;
mod sprite;

pub use dialogue::DialogueBox;
pub use sprite::SpriteFrame;
