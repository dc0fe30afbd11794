//! Panel TUI - Terminal presence panel
//!
//! This crate puts a [`panel_core::Panel`] on screen: a framed character
//! sprite, a dialogue box revealed one character at a time, and a
//! connection indicator.
//!
//! # Architecture
//!
//! - **App**: single-threaded tokio loop over terminal input, transport
//!   events, timer deadlines and the frame interval
//! - **View**: the [`panel_core::Renderer`] implementation
//! - **Widgets**: sprite frame and dialogue box
//! - **Theme**: palette and treatment styling

pub mod app;
pub mod cli;
pub mod logging;
pub mod theme;
pub mod view;
pub mod widgets;

pub use app::App;
pub use cli::Args;
pub use view::PanelView;
