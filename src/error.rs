//! Errors surfaced by the audio subsystem.

use thiserror::Error;

/// Failure to load or start a clip.
///
/// The event loop logs these and moves on; a failed request never blocks the
/// requests queued behind it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The clip does not exist in the sounds directory
    #[error("clip not found: {0}")]
    ClipNotFound(String),

    /// The clip exists but could not be probed or decoded
    #[error("failed to decode clip {clip}: {reason}")]
    Decode { clip: String, reason: String },

    /// No usable output device, or the device rejected a sink
    #[error("audio device unavailable: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
