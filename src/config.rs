//! Configuration management for LiveSitter
//!
//! Handles config file loading and backend location resolution.
//! Config is stored at ~/.config/livesitter/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_API_BASE;
use crate::stream::{LocalPlayer, PlaybackAdapter, PlayerType};

/// Environment variable overriding the backend base URL
pub const API_BASE_ENV: &str = "LIVESITTER_API_BASE";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Backend base URL (start_stream, overlay, HLS segments)
    pub api_base: Option<String>,
    /// Preferred player (mpv, ffplay, vlc)
    pub player: Option<String>,
    /// Explicit path to the preferred player's executable
    pub player_path: Option<PathBuf>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/livesitter/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("livesitter").join("config.toml"))
    }

    /// Log file used while the TUI owns the terminal
    pub fn log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("livesitter").join("livesitter.log"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load from an explicit path; missing or invalid files give the default
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Get the backend base URL with fallback chain:
    /// 1. Explicit override (the `--api-base` flag)
    /// 2. Environment variable LIVESITTER_API_BASE
    /// 3. Value from config file
    /// 4. http://localhost:5001
    pub fn api_base(&self, flag: Option<&str>) -> String {
        if let Some(base) = flag.filter(|b| !b.trim().is_empty()) {
            return base.trim().to_string();
        }
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                return base.trim().to_string();
            }
        }
        self.api_base
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    /// Preferred player type; unknown names fall back to the default
    pub fn player_type(&self) -> PlayerType {
        self.player
            .as_deref()
            .and_then(PlayerType::from_name)
            .unwrap_or_default()
    }

    /// Preferred player. `player_path` belongs to the configured player, so
    /// it is applied only when `choice` picks that same player.
    pub fn preferred_player(&self, choice: Option<PlayerType>) -> LocalPlayer {
        let configured = self.player_type();
        let chosen = choice.unwrap_or(configured);
        let player = LocalPlayer::new(chosen);
        match &self.player_path {
            Some(path) if chosen == configured => player.with_program(path.display().to_string()),
            _ => player,
        }
    }

    /// Playback adapter: preferred player first, then the fallbacks
    pub fn playback_adapter(&self, choice: Option<PlayerType>) -> PlaybackAdapter {
        PlaybackAdapter::with_preferred(self.preferred_player(choice))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
