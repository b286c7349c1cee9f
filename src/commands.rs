//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the backend clients and the local
//! playback adapter. Each handler takes CLI args, the shared context and
//! Output, and returns an ExitCode.

use serde::Serialize;
use tracing::debug;

use crate::api::Backend;
use crate::cli::{
    CreateOverlayCmd, ExitCode, OverlayCmd, Output, PlayCmd, PlaybackReport, PlayerChoice,
    StartCmd, StreamStarted, UpdateOverlayCmd, UserArg,
};
use crate::config::Config;
use crate::models::{OverlayRecord, OverlaySet};

/// What every handler needs besides its own arguments
pub struct Context {
    pub config: Config,
    pub backend: Backend,
}

impl Context {
    /// Resolve the backend from the flag, environment and config
    pub fn new(config: Config, api_base: Option<&str>) -> Self {
        let backend = Backend::new(config.api_base(api_base));
        Self { config, backend }
    }
}

/// Overlay write acknowledgement
#[derive(Debug, Serialize)]
struct OverlayAck<'a> {
    status: &'static str,
    user: &'a str,
}

/// Stored overlay as printed by `overlay show`
#[derive(Debug, Serialize)]
struct StoredOverlay<'a> {
    user: &'a str,
    overlays: OverlaySet,
}

// =============================================================================
// Stream Commands
// =============================================================================

pub async fn start_cmd(cmd: StartCmd, ctx: &Context, output: &Output) -> ExitCode {
    output.info(format!("Starting stream: {}", cmd.rtsp_url));

    let hls_url = match ctx.backend.streams.start_stream(&cmd.rtsp_url).await {
        Ok(url) => url,
        Err(e) => return output.api_error(&e),
    };

    let started = StreamStarted {
        rtsp_url: cmd.rtsp_url.trim().to_string(),
        hls_url: hls_url.clone(),
    };
    if let Err(e) = output.print(&started) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }

    if cmd.play {
        play_endpoint(&hls_url, cmd.player, &ctx.config, output).await
    } else {
        ExitCode::Success
    }
}

pub async fn play_cmd(cmd: PlayCmd, ctx: &Context, output: &Output) -> ExitCode {
    let url = cmd.hls_url.trim();
    if url.is_empty() {
        return output.error("HLS URL must not be empty", ExitCode::InvalidArgs);
    }
    play_endpoint(url, cmd.player, &ctx.config, output).await
}

/// Attach the playback adapter and wait until the player closes
async fn play_endpoint(
    url: &str,
    choice: Option<PlayerChoice>,
    config: &Config,
    output: &Output,
) -> ExitCode {
    let mut adapter = config.playback_adapter(choice.map(Into::into));

    let report = match adapter.attach(url).await {
        Ok(Some(session)) => PlaybackReport {
            session: session.id().to_string(),
            player: session.player().to_string(),
            url: session.url().to_string(),
        },
        Ok(None) => {
            return output.error(
                "No local player found. Install mpv, ffplay or VLC.",
                ExitCode::NoPlayer,
            )
        }
        Err(e) => return output.error(e.to_string(), ExitCode::Error),
    };

    output.info(format!("Playing in {}...", report.player));
    if let Err(e) = output.print(&report) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }

    if let Some(session) = adapter.take_session() {
        // Dropping the session on Ctrl+C kills the player
        tokio::select! {
            _ = session.wait() => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted, stopping player");
                output.info("Stopping player...");
            }
        }
    }
    ExitCode::Success
}

// =============================================================================
// Overlay Commands
// =============================================================================

pub async fn overlay_cmd(cmd: OverlayCmd, ctx: &Context, output: &Output) -> ExitCode {
    match cmd {
        OverlayCmd::Create(cmd) => create_overlay(cmd, ctx, output).await,
        OverlayCmd::Update(cmd) => update_overlay(cmd, ctx, output).await,
        OverlayCmd::Show(arg) => show_overlay(arg, ctx, output).await,
        OverlayCmd::Delete(arg) => delete_overlay(arg, ctx, output).await,
    }
}

fn validate_user(user: &str) -> Result<&str, &'static str> {
    let user = user.trim();
    if user.is_empty() {
        Err("User must not be empty")
    } else {
        Ok(user)
    }
}

async fn create_overlay(cmd: CreateOverlayCmd, ctx: &Context, output: &Output) -> ExitCode {
    let user = match validate_user(&cmd.user) {
        Ok(user) => user,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };
    if cmd.rtsp_url.trim().is_empty() {
        return output.error("An RTSP URL is required to create an overlay", ExitCode::InvalidArgs);
    }

    let record = OverlayRecord {
        rtsp_url: cmd.rtsp_url.trim().to_string(),
        hls_url: cmd.hls_url.trim().to_string(),
        overlays: cmd.overlay.to_overlays(),
    };
    match ctx.backend.overlays.create(user, &record).await {
        Ok(()) => print_ack(output, "created", user),
        Err(e) => output.api_error(&e),
    }
}

async fn update_overlay(cmd: UpdateOverlayCmd, ctx: &Context, output: &Output) -> ExitCode {
    let user = match validate_user(&cmd.user) {
        Ok(user) => user,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    let overlays = cmd.overlay.to_overlays();
    match ctx.backend.overlays.update(user, &overlays).await {
        Ok(()) => print_ack(output, "updated", user),
        Err(e) => output.api_error(&e),
    }
}

async fn show_overlay(arg: UserArg, ctx: &Context, output: &Output) -> ExitCode {
    let user = match validate_user(&arg.user) {
        Ok(user) => user,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    match ctx.backend.overlays.restore(user).await {
        Ok(overlays) => {
            if let Err(e) = output.print(StoredOverlay { user, overlays }) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.api_error(&e),
    }
}

async fn delete_overlay(arg: UserArg, ctx: &Context, output: &Output) -> ExitCode {
    let user = match validate_user(&arg.user) {
        Ok(user) => user,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    match ctx.backend.overlays.delete(user).await {
        Ok(()) => print_ack(output, "deleted", user),
        Err(e) => output.api_error(&e),
    }
}

fn print_ack(output: &Output, status: &'static str, user: &str) -> ExitCode {
    match output.print(OverlayAck { status, user }) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}
