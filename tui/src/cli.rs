//! Command Line Interface

use std::path::PathBuf;

use clap::Parser;
use panel_core::ConfigOverrides;

/// Presence panel - a character whose state follows a remote event stream
#[derive(Parser, Debug)]
#[command(name = "panel-tui")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Origin of the event source; the endpoint is <origin>/ws with http→ws, https→wss
    #[arg(short = 'o', long, value_name = "URL")]
    pub origin: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "PANEL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Delay before reconnecting after a lost connection
    #[arg(long, value_name = "MS")]
    pub reconnect_delay_ms: Option<u64>,

    /// Typewriter pacing per character
    #[arg(long, value_name = "MS")]
    pub char_delay_ms: Option<u64>,

    /// Directory holding idle.txt, talking.txt and thinking.txt
    #[arg(short = 'a', long, value_name = "DIR")]
    pub asset_dir: Option<PathBuf>,

    /// Line revealed whenever a connection opens (empty for none)
    #[arg(long, value_name = "TEXT")]
    pub connected_text: Option<String>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "PANEL_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// The configuration layer given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            origin: self.origin.clone(),
            reconnect_delay_ms: self.reconnect_delay_ms,
            char_delay_ms: self.char_delay_ms,
            asset_dir: self.asset_dir.clone(),
            connected_text: self.connected_text.clone(),
        }
    }
}
