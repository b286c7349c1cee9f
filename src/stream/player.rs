//! Local Player - HLS playback through mpv, ffplay or VLC
//!
//! The adapter binds one player process to the current HLS endpoint. It
//! re-binds when the endpoint changes, always killing the previous process
//! first, and falls back to the next installed player when the preferred one
//! is missing.

use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Supported local players, in default preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// mpv: adaptive HLS with variant switching (default)
    #[default]
    Mpv,
    /// ffplay: plain libavformat playback
    Ffplay,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    pub const ALL: [PlayerType; 3] = [PlayerType::Mpv, PlayerType::Ffplay, PlayerType::Vlc];

    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Mpv => "mpv",
            PlayerType::Ffplay => "ffplay",
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Mpv => "mpv",
            PlayerType::Ffplay => "ffplay",
            PlayerType::Vlc => "VLC",
        }
    }

    /// Parse a config/CLI name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mpv" => Some(PlayerType::Mpv),
            "ffplay" => Some(PlayerType::Ffplay),
            "vlc" => Some(PlayerType::Vlc),
            _ => None,
        }
    }

    /// Player arguments for a live HLS URL
    fn args(&self, stream_url: &str) -> Vec<String> {
        match self {
            PlayerType::Mpv => vec![
                stream_url.to_string(),
                "--force-window=immediate".to_string(),
                "--no-terminal".to_string(),
                "--profile=low-latency".to_string(),
            ],
            PlayerType::Ffplay => vec![
                "-loglevel".to_string(),
                "error".to_string(),
                "-fflags".to_string(),
                "nobuffer".to_string(),
                stream_url.to_string(),
            ],
            PlayerType::Vlc => vec![
                stream_url.to_string(),
                "--no-video-title-show".to_string(),
                "--intf=dummy".to_string(),
            ],
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
}

/// One local player binary
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    player_type: PlayerType,
    program: String,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        Self {
            player_type,
            program: player_type.command().to_string(),
        }
    }

    /// Use a specific executable instead of looking the player up in PATH
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        // Explicit path: it exists or it doesn't
        if self.program.contains(std::path::MAIN_SEPARATOR) {
            return Path::new(&self.program).exists();
        }

        // Otherwise use 'which' to find in PATH
        Command::new("which")
            .arg(&self.program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Spawn the player on `stream_url`.
    ///
    /// The child is killed if its handle is dropped.
    pub fn play(&self, stream_url: &str) -> Result<Child, PlayerError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.player_type.args(stream_url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Own session: keeps the player off the TUI's controlling terminal
        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.program.clone())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }
}

// =============================================================================
// Playback Adapter
// =============================================================================

/// A player process bound to one endpoint
#[derive(Debug)]
pub struct PlaybackSession {
    id: Uuid,
    url: String,
    player: PlayerType,
    child: Child,
}

impl PlaybackSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn player(&self) -> PlayerType {
        self.player
    }

    /// OS process id, while the process has not been reaped
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether the player process is still alive
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Wait for the user to close the player
    pub async fn wait(mut self) {
        let _ = self.child.wait().await;
        debug!(session = %self.id, "player exited");
    }

    /// Kill the player and reap it
    async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(session = %self.id, error = %e, "player already gone");
        }
        info!(session = %self.id, url = %self.url, "playback detached");
    }
}

/// Binds the current HLS endpoint to at most one running player
#[derive(Debug)]
pub struct PlaybackAdapter {
    candidates: Vec<LocalPlayer>,
    session: Option<PlaybackSession>,
}

impl PlaybackAdapter {
    /// Adapter trying `candidates` in order
    pub fn new(candidates: Vec<LocalPlayer>) -> Self {
        Self {
            candidates,
            session: None,
        }
    }

    /// Preferred player first, then the remaining known players
    pub fn with_preferred(preferred: LocalPlayer) -> Self {
        let first = preferred.player_type();
        let mut candidates = vec![preferred];
        candidates.extend(
            PlayerType::ALL
                .into_iter()
                .filter(|p| *p != first)
                .map(LocalPlayer::new),
        );
        Self::new(candidates)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Endpoint of the live session, if any
    pub fn current_url(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.url())
    }

    /// Bind `url`, tearing down any session on a different endpoint first.
    ///
    /// `Ok(None)` means no player is installed; nothing plays and this is not
    /// reported as an error. A player that fails to spawn is skipped; the last
    /// spawn error is returned only when no candidate could start.
    pub async fn attach(&mut self, url: &str) -> Result<Option<&PlaybackSession>, PlayerError> {
        if let Some(session) = self.session.as_mut() {
            if session.url == url && session.is_running() {
                return Ok(self.session.as_ref());
            }
        }
        self.detach().await;

        let mut last_error = None;
        for candidate in &self.candidates {
            if !candidate.is_available().await {
                debug!(
                    player = %candidate.player_type(),
                    program = candidate.program(),
                    "player unavailable"
                );
                continue;
            }
            let child = match candidate.play(url) {
                Ok(child) => child,
                Err(e) => {
                    warn!(player = %candidate.player_type(), error = %e, "player failed to start");
                    last_error = Some(e);
                    continue;
                }
            };
            let session = PlaybackSession {
                id: Uuid::new_v4(),
                url: url.to_string(),
                player: candidate.player_type(),
                child,
            };
            info!(session = %session.id, player = %session.player, url, "playback attached");
            self.session = Some(session);
            return Ok(self.session.as_ref());
        }

        if let Some(e) = last_error {
            return Err(e);
        }
        warn!(url, "no local player available for HLS playback");
        Ok(None)
    }

    /// Release the current session, if any
    pub async fn detach(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown().await;
        }
    }

    /// Hand the live session to the caller (e.g. to wait on it)
    pub fn take_session(&mut self) -> Option<PlaybackSession> {
        self.session.take()
    }
}

impl Default for PlaybackAdapter {
    fn default() -> Self {
        Self::with_preferred(LocalPlayer::new(PlayerType::default()))
    }
}
