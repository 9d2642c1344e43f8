pub mod backend;
pub mod clip;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod sound_queue;

pub use backend::{AudioBackend, CompletionHook, RodioBackend, RodioClip};
pub use clip::{probe_clip, ClipInfo};
pub use config::{ButtonConfig, SoundboxConfig};
pub use dispatcher::{Dispatcher, SoundEvent};
pub use error::PlaybackError;
pub use sound_queue::{
    ClipHandle, PlaybackRequest, RequestId, RequestState, SchedulerState, SoundQueueScheduler,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
