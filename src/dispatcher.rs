use std::ops::ControlFlow;

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::backend::AudioBackend;
use crate::error::PlaybackError;
use crate::sound_queue::{PlaybackRequest, RequestId, SchedulerState, SoundQueueScheduler};

#[derive(Debug, Clone, PartialEq)]
pub enum SoundEvent {
    /// A button was pressed for this clip
    Pressed(String),
    /// The audio subsystem finished playing this request
    Finished(RequestId),
    Status,
    Shutdown,
}

/// Single consumer for button presses and playback completions.
///
/// Completion hooks fire on whatever thread the audio backend uses; they only
/// post into this dispatcher's channel, so the scheduler is touched from one
/// task only.
pub struct Dispatcher<B: AudioBackend> {
    backend: B,
    scheduler: SoundQueueScheduler<B::Handle>,
    events_tx: UnboundedSender<SoundEvent>,
    events_rx: UnboundedReceiver<SoundEvent>,
    next_id: RequestId,
}

impl<B: AudioBackend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            scheduler: SoundQueueScheduler::new(),
            events_tx,
            events_rx,
            next_id: 1,
        }
    }

    pub fn sender(&self) -> UnboundedSender<SoundEvent> {
        self.events_tx.clone()
    }

    pub fn scheduler(&self) -> &SoundQueueScheduler<B::Handle> {
        &self.scheduler
    }

    /// Load `clip` and queue it behind whatever is already playing.
    pub fn play_clip(&mut self, clip: &str) -> Result<RequestId, PlaybackError> {
        let id = self.next_id;
        self.next_id += 1;

        let tx = self.events_tx.clone();
        let hook = Box::new(move || {
            // Receiver only goes away at shutdown
            let _ = tx.send(SoundEvent::Finished(id));
        });

        let handle = self.backend.load(clip, hook)?;
        self.scheduler
            .enqueue_and_attempt(PlaybackRequest::new(id, clip, handle));
        Ok(id)
    }

    pub fn handle_event(&mut self, event: SoundEvent) -> ControlFlow<()> {
        debug!(?event, "dispatching");

        match event {
            SoundEvent::Pressed(clip) => {
                if let Err(e) = self.play_clip(&clip) {
                    error!(clip = %clip, error = %e, "could not queue clip");
                }
            }
            SoundEvent::Finished(id) => match self.scheduler.on_playback_finished() {
                Some(removed) if removed != id => {
                    warn!(reported = id, removed, "completion did not match the front request");
                }
                Some(_) => {}
                None => warn!(reported = id, "completion arrived with an empty queue"),
            },
            SoundEvent::Status => {
                info!(
                    state = ?self.scheduler.state(),
                    queued = self.scheduler.len(),
                    clips = ?self.scheduler.clips(),
                    "queue status"
                );
            }
            SoundEvent::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Wait for the next event. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<SoundEvent> {
        self.events_rx.recv().await
    }

    /// Handle events until a shutdown is requested.
    pub async fn run(&mut self) -> Result<()> {
        while let Some(event) = self.next_event().await {
            if self.handle_event(event).is_break() {
                info!("dispatcher shutting down");
                break;
            }
        }
        Ok(())
    }

    /// Handle events until every queued clip has played.
    pub async fn run_until_idle(&mut self) -> Result<()> {
        while self.scheduler.state() == SchedulerState::Draining {
            let Some(event) = self.next_event().await else {
                break;
            };
            if self.handle_event(event).is_break() {
                break;
            }
        }
        Ok(())
    }
}
