//! CLI - Command Line Interface for LiveSitter
//!
//! Every backend operation the TUI performs is scriptable. Output is JSON when
//! asked for (or when stdout is not a terminal).
//!
//! # Examples
//!
//! ```bash
//! # Start a stream and print the HLS endpoint
//! livesitter start rtsp://camera.local/cam1
//!
//! # Start and watch it locally
//! livesitter start rtsp://camera.local/cam1 --play --player ffplay
//!
//! # Overlay records
//! livesitter overlay create alice --text "On Air" --x 40 --y 20
//! livesitter overlay show alice --json
//! livesitter overlay delete alice
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::ApiError;
use crate::models::{
    CaptionOverlay, Extent, LogoOverlay, OverlaySet, DEFAULT_FONT_SIZE, DEFAULT_OPACITY,
};
use crate::stream::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// General error
    Error = 1,
    InvalidArgs = 2,
    NetworkError = 3,
    /// Backend answered 404
    NotFound = 4,
    /// Stored overlay does not hold one caption and one logo
    MalformedRecord = 5,
    /// No local player installed
    NoPlayer = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<&ApiError> for ExitCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::EmptyUrl => ExitCode::InvalidArgs,
            ApiError::Network(_) => ExitCode::NetworkError,
            ApiError::Malformed(_) => ExitCode::MalformedRecord,
            e if e.is_not_found() => ExitCode::NotFound,
            _ => ExitCode::Error,
        }
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// LiveSitter - RTSP to HLS viewer with draggable overlays
///
/// Run without arguments to launch the interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "livesitter",
    version,
    about = "RTSP to HLS viewer with draggable overlays",
    long_about = "Starts live streams through the LiveSitter backend, plays the \
                  resulting HLS endpoint locally and edits the caption and logo \
                  overlays drawn over it.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  livesitter                                   Launch interactive TUI\n\
                  livesitter start rtsp://cam/1 --play         Start and play a stream\n\
                  livesitter overlay show alice --json         Print a stored overlay"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides env and config)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the backend to start an RTSP stream
    Start(StartCmd),

    /// Play an existing HLS endpoint locally
    #[command(visible_alias = "pl")]
    Play(PlayCmd),

    /// Manage stored overlays
    #[command(subcommand, visible_alias = "ov")]
    Overlay(OverlayCmd),
}

/// Local player choice
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerChoice {
    Mpv,
    Ffplay,
    Vlc,
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> Self {
        match choice {
            PlayerChoice::Mpv => PlayerType::Mpv,
            PlayerChoice::Ffplay => PlayerType::Ffplay,
            PlayerChoice::Vlc => PlayerType::Vlc,
        }
    }
}

/// Start a stream
#[derive(Args, Debug)]
pub struct StartCmd {
    /// RTSP source URL
    #[arg(required = true)]
    pub rtsp_url: String,

    /// Play the endpoint once it is ready
    #[arg(long)]
    pub play: bool,

    /// Preferred player (default from config)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerChoice>,
}

/// Play an HLS endpoint
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// HLS playlist URL
    #[arg(required = true)]
    pub hls_url: String,

    /// Preferred player (default from config)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerChoice>,
}

#[derive(Subcommand, Debug)]
pub enum OverlayCmd {
    /// Store a new overlay record for a user
    Create(CreateOverlayCmd),

    /// Replace a user's stored overlay elements
    Update(UpdateOverlayCmd),

    /// Print a user's stored overlay
    #[command(visible_alias = "restore")]
    Show(UserArg),

    /// Delete a user's stored overlay
    #[command(visible_alias = "rm")]
    Delete(UserArg),
}

#[derive(Args, Debug)]
pub struct UserArg {
    /// User identifier the record is stored under
    #[arg(required = true)]
    pub user: String,
}

#[derive(Args, Debug)]
pub struct CreateOverlayCmd {
    /// User identifier the record is stored under
    #[arg(required = true)]
    pub user: String,

    /// RTSP URL recorded with the overlay
    #[arg(long)]
    pub rtsp_url: String,

    /// HLS URL recorded with the overlay
    #[arg(long, default_value = "")]
    pub hls_url: String,

    #[command(flatten)]
    pub overlay: OverlayArgs,
}

#[derive(Args, Debug)]
pub struct UpdateOverlayCmd {
    /// User identifier the record is stored under
    #[arg(required = true)]
    pub user: String,

    #[command(flatten)]
    pub overlay: OverlayArgs,
}

/// Overlay values; each defaults to the editor's initial value
#[derive(Args, Debug, Clone)]
pub struct OverlayArgs {
    /// Caption text
    #[arg(long, default_value = "Live")]
    pub text: String,

    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    pub x: f64,

    #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
    pub y: f64,

    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    pub font_size: f64,

    #[arg(long, default_value_t = DEFAULT_OPACITY)]
    pub opacity: f64,

    /// Logo image URL (empty hides the logo)
    #[arg(long, default_value = "")]
    pub logo_url: String,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub logo_x: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub logo_y: f64,

    #[arg(long, default_value_t = 100.0)]
    pub logo_width: f64,

    #[arg(long, default_value_t = 100.0)]
    pub logo_height: f64,

    #[arg(long, default_value_t = DEFAULT_OPACITY)]
    pub logo_opacity: f64,

    /// Clamp positions into a container of this size first (e.g. 1280x720)
    #[arg(long, value_parser = parse_extent)]
    pub container: Option<Extent>,
}

impl OverlayArgs {
    /// Overlay model described by the flags, clamped when a container is given
    pub fn to_overlays(&self) -> OverlaySet {
        let mut overlays = OverlaySet::new(
            CaptionOverlay {
                text: self.text.clone(),
                x: self.x,
                y: self.y,
                font_size: self.font_size,
                opacity: self.opacity,
            },
            LogoOverlay {
                image_url: self.logo_url.clone(),
                x: self.logo_x,
                y: self.logo_y,
                width: self.logo_width,
                height: self.logo_height,
                opacity: self.logo_opacity,
            },
        );
        if let Some(container) = self.container {
            overlays.clamp_into(container);
        }
        overlays
    }
}

fn parse_extent(s: &str) -> Result<Extent, String> {
    Extent::parse(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }
}

impl JsonOutput<()> {
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> Self {
        Self {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// `start` response
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamStarted {
    pub rtsp_url: String,
    pub hls_url: String,
}

/// `play` / `start --play` response
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub session: String,
    pub player: String,
    pub url: String,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&JsonOutput::success(data))?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print an API failure with the matching exit code
    pub fn api_error(&self, err: &ApiError) -> ExitCode {
        self.error(err.to_string(), ExitCode::from(err))
    }

    /// Print info message (suppressed in quiet and JSON modes)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use reqwest::StatusCode;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from(["livesitter"]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_start_command() {
        let cli = Cli::parse_from([
            "livesitter",
            "start",
            "rtsp://cam/1",
            "--play",
            "-p",
            "ffplay",
        ]);
        match cli.command {
            Some(Command::Start(cmd)) => {
                assert_eq!(cmd.rtsp_url, "rtsp://cam/1");
                assert!(cmd.play);
                assert_eq!(cmd.player, Some(PlayerChoice::Ffplay));
            }
            other => panic!("Expected Start command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "livesitter",
            "overlay",
            "show",
            "alice",
            "--json",
            "--api-base",
            "http://backend:5001",
        ]);
        assert!(cli.json);
        assert_eq!(cli.api_base.as_deref(), Some("http://backend:5001"));
    }

    #[test]
    fn test_overlay_defaults_match_model() {
        let cli = Cli::parse_from(["livesitter", "overlay", "update", "alice"]);
        match cli.command {
            Some(Command::Overlay(OverlayCmd::Update(cmd))) => {
                assert_eq!(cmd.user, "alice");
                assert_eq!(cmd.overlay.to_overlays(), OverlaySet::default());
            }
            other => panic!("Expected overlay update, got {:?}", other),
        }
    }

    #[test]
    fn test_container_clamps_flags() {
        let cli = Cli::parse_from([
            "livesitter",
            "overlay",
            "create",
            "alice",
            "--rtsp-url",
            "rtsp://cam/1",
            "--x",
            "-40",
            "--logo-url",
            "logo.png",
            "--logo-x",
            "5000",
            "--container",
            "640x360",
        ]);
        match cli.command {
            Some(Command::Overlay(OverlayCmd::Create(cmd))) => {
                let overlays = cmd.overlay.to_overlays();
                assert_eq!(overlays.caption.x, 0.0);
                assert_eq!(overlays.logo.x, 540.0);
            }
            other => panic!("Expected overlay create, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_container_rejected() {
        let result = Cli::try_parse_from([
            "livesitter",
            "overlay",
            "update",
            "alice",
            "--container",
            "wide",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_requires_rtsp_url() {
        let result = Cli::try_parse_from(["livesitter", "overlay", "create", "alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_exit_codes_from_api_errors() {
        assert_eq!(ExitCode::from(&ApiError::EmptyUrl), ExitCode::InvalidArgs);
        assert_eq!(
            ExitCode::from(&ApiError::Status(StatusCode::NOT_FOUND)),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
            ExitCode::Error
        );
        assert_eq!(i32::from(ExitCode::NoPlayer), 6);
    }

    #[test]
    fn test_json_output_skips_empty_fields() {
        let started = StreamStarted {
            rtsp_url: "rtsp://cam".into(),
            hls_url: "http://h/s.m3u8".into(),
        };
        let ok = serde_json::to_string(&JsonOutput::success(started)).unwrap();
        assert_eq!(
            ok,
            r#"{"data":{"rtsp_url":"rtsp://cam","hls_url":"http://h/s.m3u8"}}"#
        );

        let err =
            serde_json::to_string(&JsonOutput::error_msg("boom", ExitCode::NotFound)).unwrap();
        assert_eq!(err, r#"{"error":"boom","exit_code":4}"#);
    }
}
