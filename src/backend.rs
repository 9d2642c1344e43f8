use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use rodio::source::EmptyCallback;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, info};

use crate::clip::probe_clip;
use crate::error::PlaybackError;
use crate::sound_queue::ClipHandle;

/// Invoked once when a clip plays to its end. May run on the audio thread.
pub type CompletionHook = Box<dyn Fn() + Send + 'static>;

/// Loads named clips into playable handles.
pub trait AudioBackend {
    type Handle: ClipHandle;

    fn load(&mut self, clip: &str, on_finished: CompletionHook) -> Result<Self::Handle, PlaybackError>;
}

/// A decoded clip waiting in its own paused sink.
pub struct RodioClip {
    clip: String,
    sink: Sink,
}

impl ClipHandle for RodioClip {
    fn start(&mut self) -> Result<(), PlaybackError> {
        // Sink::play only un-pauses; on a running sink it does nothing
        if self.sink.is_paused() {
            debug!(clip = %self.clip, "starting sink");
        }
        self.sink.play();
        Ok(())
    }
}

pub struct RodioBackend {
    sounds_dir: PathBuf,
    volume: f32,
    stream_handle: OutputStreamHandle,
    _stream: OutputStream,
}

impl RodioBackend {
    pub fn new<P: Into<PathBuf>>(sounds_dir: P, volume: f32) -> Result<Self, PlaybackError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;

        let sounds_dir = sounds_dir.into();
        info!(sounds_dir = %sounds_dir.display(), "audio output stream initialized");

        Ok(Self {
            sounds_dir,
            volume: volume.clamp(0.0, 1.0),
            stream_handle,
            _stream: stream,
        })
    }

    pub fn resolve(&self, clip: &str) -> PathBuf {
        self.sounds_dir.join(clip)
    }
}

impl AudioBackend for RodioBackend {
    type Handle = RodioClip;

    fn load(&mut self, clip: &str, on_finished: CompletionHook) -> Result<RodioClip, PlaybackError> {
        let path = self.resolve(clip);
        let info = probe_clip(&path)?;

        let file = File::open(&path).map_err(|_| PlaybackError::ClipNotFound(clip.to_string()))?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
            clip: clip.to_string(),
            reason: e.to_string(),
        })?;

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| PlaybackError::Device(e.to_string()))?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(source);
        sink.append(EmptyCallback::<f32>::new(on_finished));

        debug!(clip = %info, "clip loaded");

        Ok(RodioClip {
            clip: clip.to_string(),
            sink,
        })
    }
}
