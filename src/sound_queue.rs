use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::error::PlaybackError;

pub type RequestId = u64;

/// Playback controls for one loaded clip.
#[cfg_attr(test, mockall::automock)]
pub trait ClipHandle {
    /// Begin playback.
    ///
    /// The scheduler re-issues this on the front request every time it attempts
    /// playback, so calling it on a handle that is already playing must be a no-op.
    fn start(&mut self) -> Result<(), PlaybackError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Started,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Draining,
}

#[derive(Debug)]
pub struct PlaybackRequest<H> {
    id: RequestId,
    clip: String,
    state: RequestState,
    handle: H,
}

impl<H: ClipHandle> PlaybackRequest<H> {
    pub fn new(id: RequestId, clip: impl Into<String>, handle: H) -> Self {
        Self {
            id,
            clip: clip.into(),
            state: RequestState::Pending,
            handle,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn clip(&self) -> &str {
        &self.clip
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        self.handle.start()?;
        self.state = RequestState::Started;
        Ok(())
    }
}

impl<H> std::fmt::Display for PlaybackRequest<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.id, self.clip)
    }
}

/// Plays queued clips one at a time in arrival order.
///
/// Only the front request is ever started. It stays at the front until the
/// audio subsystem reports that it finished, at which point it is dropped and
/// the next request is started.
#[derive(Debug)]
pub struct SoundQueueScheduler<H> {
    queue: VecDeque<PlaybackRequest<H>>,
}

impl<H: ClipHandle> SoundQueueScheduler<H> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn enqueue_and_attempt(&mut self, request: PlaybackRequest<H>) {
        debug!(request = %request, queued = self.queue.len(), "enqueue");
        self.queue.push_back(request);
        self.attempt_play();
    }

    /// Issue start on the front request, whether or not it already started.
    ///
    /// A request that fails to start is logged and discarded so the queue
    /// keeps moving.
    pub fn attempt_play(&mut self) {
        while let Some(front) = self.queue.front_mut() {
            match front.start() {
                Ok(()) => return,
                Err(e) => {
                    warn!(request = %front, error = %e, "dropping request that failed to start");
                    self.queue.pop_front();
                }
            }
        }
    }

    /// Discard the front request and advance. No-op on an empty queue.
    pub fn on_playback_finished(&mut self) -> Option<RequestId> {
        let finished = self.queue.pop_front()?;
        info!(request = %finished, remaining = self.queue.len(), "clip finished");
        let id = finished.id();
        drop(finished);

        self.attempt_play();
        Some(id)
    }

    pub fn state(&self) -> SchedulerState {
        if self.queue.is_empty() {
            SchedulerState::Idle
        } else {
            SchedulerState::Draining
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn front(&self) -> Option<&PlaybackRequest<H>> {
        self.queue.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaybackRequest<H>> {
        self.queue.iter()
    }

    pub fn clips(&self) -> Vec<&str> {
        self.queue.iter().map(|r| r.clip()).collect()
    }

    pub fn display_queue(&self) -> String {
        if self.queue.is_empty() {
            return "Queue is empty\n".to_string();
        }

        let mut output = String::new();
        output.push_str("Sound Queue:\n");
        output.push_str(&"─".repeat(40));
        output.push('\n');

        for (index, request) in self.queue.iter().enumerate() {
            let marker = match request.state() {
                RequestState::Started => "▶ ",
                RequestState::Pending => "  ",
            };
            output.push_str(&format!("{}{:2}. {}\n", marker, index + 1, request.clip()));
        }

        output.push_str(&"─".repeat(40));
        output.push('\n');

        output
    }
}

impl<H: ClipHandle> Default for SoundQueueScheduler<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type StartLog = Rc<RefCell<Vec<String>>>;

    struct RecordingClip {
        name: String,
        log: StartLog,
    }

    impl ClipHandle for RecordingClip {
        fn start(&mut self) -> Result<(), PlaybackError> {
            self.log.borrow_mut().push(self.name.clone());
            Ok(())
        }
    }

    fn request(id: RequestId, name: &str, log: &StartLog) -> PlaybackRequest<RecordingClip> {
        let handle = RecordingClip {
            name: name.to_string(),
            log: Rc::clone(log),
        };
        PlaybackRequest::new(id, name, handle)
    }

    #[test]
    fn test_empty_scheduler_is_idle() {
        let scheduler: SoundQueueScheduler<RecordingClip> = SoundQueueScheduler::new();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.front().is_none());
        assert_eq!(scheduler.display_queue(), "Queue is empty\n");
    }

    #[test]
    fn test_only_front_is_started() {
        let log = StartLog::default();
        let mut scheduler = SoundQueueScheduler::new();

        scheduler.enqueue_and_attempt(request(1, "A", &log));
        scheduler.enqueue_and_attempt(request(2, "B", &log));
        scheduler.enqueue_and_attempt(request(3, "C", &log));

        assert_eq!(scheduler.clips(), vec!["A", "B", "C"]);
        assert_eq!(*log.borrow(), vec!["A", "A", "A"]);

        let states: Vec<_> = scheduler.iter().map(|r| r.state()).collect();
        assert_eq!(
            states,
            vec![RequestState::Started, RequestState::Pending, RequestState::Pending]
        );
    }

    #[test]
    fn test_finish_returns_removed_id() {
        let log = StartLog::default();
        let mut scheduler = SoundQueueScheduler::new();
        scheduler.enqueue_and_attempt(request(7, "A", &log));

        assert_eq!(scheduler.on_playback_finished(), Some(7));
        assert_eq!(scheduler.on_playback_finished(), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_failed_start_is_skipped() {
        let mut scheduler = SoundQueueScheduler::new();

        let mut broken = MockClipHandle::new();
        broken
            .expect_start()
            .times(1)
            .returning(|| Err(PlaybackError::Device("sink rejected".into())));

        let mut healthy = MockClipHandle::new();
        healthy.expect_start().times(1).returning(|| Ok(()));

        scheduler.enqueue_and_attempt(PlaybackRequest::new(1, "broken", broken));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        scheduler.enqueue_and_attempt(PlaybackRequest::new(2, "healthy", healthy));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.front().map(|r| r.state()), Some(RequestState::Started));
    }

    #[test]
    fn test_failed_start_advances_to_next_pending() {
        let mut scheduler = SoundQueueScheduler::new();

        // Started once per enqueue while it sits at the front
        let mut first = MockClipHandle::new();
        first.expect_start().times(3).returning(|| Ok(()));

        let mut second = MockClipHandle::new();
        second.expect_start().times(1).returning(|| {
            Err(PlaybackError::Decode {
                clip: "second".into(),
                reason: "truncated".into(),
            })
        });

        let mut third = MockClipHandle::new();
        third.expect_start().times(1).returning(|| Ok(()));

        scheduler.enqueue_and_attempt(PlaybackRequest::new(1, "first", first));
        scheduler.enqueue_and_attempt(PlaybackRequest::new(2, "second", second));
        scheduler.enqueue_and_attempt(PlaybackRequest::new(3, "third", third));
        assert_eq!(scheduler.len(), 3);

        assert_eq!(scheduler.on_playback_finished(), Some(1));

        assert_eq!(scheduler.clips(), vec!["third"]);
        assert_eq!(scheduler.front().map(|r| r.id()), Some(3));
    }

    #[test]
    fn test_display_marks_playing_clip() {
        let log = StartLog::default();
        let mut scheduler = SoundQueueScheduler::new();
        scheduler.enqueue_and_attempt(request(1, "liiiooon.mp3", &log));
        scheduler.enqueue_and_attempt(request(2, "enjoylife.mp3", &log));

        let display = scheduler.display_queue();
        assert!(display.contains("Sound Queue"));
        assert!(display.contains("▶  1. liiiooon.mp3"));
        assert!(display.contains("   2. enjoylife.mp3"));
    }
}
