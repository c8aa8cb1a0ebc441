//! Arena configuration
//!
//! Persisted with confy under the `storm-arena` app name. Command-line
//! flags override whatever the file says for the current run.

use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ArenaError;

pub const APP_NAME: &str = "storm-arena";
const CONFIG_NAME: &str = "config";

const MIN_FPS: u32 = 10;
const MAX_FPS: u32 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub target_fps: u32,
    /// Fixed seed for reproducible battles; random when unset.
    pub seed: Option<u64>,
    pub player_name: String,
    pub enemy_name: String,
    pub show_controls: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            seed: None,
            player_name: "Kaia Stormwind".to_string(),
            enemy_name: "Storm Kraken".to_string(),
            show_controls: true,
        }
    }
}

impl ArenaConfig {
    pub fn try_load() -> Result<Self, ArenaError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    /// Load from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(fps) = cli.fps {
            self.target_fps = fps;
        }
        self
    }

    pub fn fps(&self) -> u32 {
        self.target_fps.clamp(MIN_FPS, MAX_FPS)
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps() as u64)
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Storm Arena: a terminal battle against the Storm Kraken")]
pub struct Cli {
    /// Seed both random streams for a reproducible battle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target frames per second
    #[arg(long)]
    pub fps: Option<u32>,
}
