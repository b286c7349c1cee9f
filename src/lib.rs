//! LiveSitter - RTSP to HLS viewer with draggable overlays
//!
//! Starts live streams through a transcoding backend, plays the HLS endpoint
//! in a local player and lets the user position a caption and a logo over it.
//!
//! # Modules
//!
//! - `models` - Overlay model, geometry and the wire element format
//! - `api` - Backend clients (start_stream, overlay records)
//! - `stream` - Local players and the playback adapter
//! - `drag` - Pointer drag controller
//! - `editor` - Save / restore coordination
//! - `ui` - TUI components
//! - `app` - Application state and input routing

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod drag;
pub mod editor;
pub mod models;
pub mod stream;
pub mod ui;

// Re-export commonly used types
pub use models::{
    CaptionOverlay, Extent, LogoOverlay, OverlayElement, OverlayField, OverlaySet, Point,
};

pub use api::{ApiError, Backend, OverlayClient, StreamClient};
pub use app::{App, AppEvent, Task};
pub use drag::{DragController, DragTarget};
pub use editor::{OverlayEditor, SaveMode};
pub use stream::{PlaybackAdapter, PlayerType};
