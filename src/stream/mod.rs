//! Playback infrastructure
//!
//! - Player: local HLS players and the adapter binding them to an endpoint

pub mod player;

pub use player::{LocalPlayer, PlaybackAdapter, PlaybackSession, PlayerError, PlayerType};
