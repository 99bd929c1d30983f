// src/player.rs
use crate::format::{MediaKind, format_position};
use crate::podcast::Episode;
use crate::podcast_fetch::{PlaybackEventKind, PlaybackNotice};
use log::{debug, trace};
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    MetadataLoaded,
    Play,
    Pause,
    Ended,
}

/// A playable media element. Implementations queue [`MediaEvent`]s which the
/// owning [`PlayerSession`] drains with [`MediaElement::poll_event`].
pub trait MediaElement: Send {
    fn load(&mut self, source: &str, mime_type: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
    fn is_paused(&self) -> bool;
    fn poll_event(&mut self) -> Option<MediaEvent>;
}

pub type MediaFactory = Box<dyn Fn(MediaKind, Option<f64>) -> Box<dyn MediaElement> + Send>;

pub fn clock_media_factory() -> MediaFactory {
    Box::new(|_kind, duration| Box::new(ClockMedia::new(duration)) as Box<dyn MediaElement>)
}

// ===== Clock driven media element
/// Tracks a playback position against the monotonic clock without decoding anything.
#[derive(Debug)]
pub struct ClockMedia {
    source: Option<String>,
    duration: Option<f64>,
    base_position: f64,
    started_at: Option<Instant>,
    ended: bool,
    events: VecDeque<MediaEvent>,
}

impl ClockMedia {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            source: None,
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            base_position: 0.0,
            started_at: None,
            ended: false,
            events: VecDeque::new(),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn clamp(&self, position: f64) -> f64 {
        let position = position.max(0.0);
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

impl MediaElement for ClockMedia {
    fn load(&mut self, source: &str, mime_type: &str) {
        trace!("ClockMedia: loading {} ({})", source, mime_type);
        self.source = Some(source.to_string());
        self.base_position = 0.0;
        self.started_at = None;
        self.ended = false;
        self.events.push_back(MediaEvent::MetadataLoaded);
    }

    fn play(&mut self) {
        if self.started_at.is_none() {
            if self.ended {
                self.base_position = 0.0;
                self.ended = false;
            }
            self.started_at = Some(Instant::now());
            self.events.push_back(MediaEvent::Play);
        }
    }

    fn pause(&mut self) {
        if self.started_at.is_some() {
            self.base_position = self.position();
            self.started_at = None;
            self.events.push_back(MediaEvent::Pause);
        }
    }

    fn seek(&mut self, position: f64) {
        self.base_position = self.clamp(position);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn position(&self) -> f64 {
        let elapsed = self.started_at.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0);
        self.clamp(self.base_position + elapsed)
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.started_at.is_none()
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        if let (Some(duration), Some(_)) = (self.duration, self.started_at) {
            if self.position() >= duration {
                self.base_position = duration;
                self.started_at = None;
                self.ended = true;
                self.events.push_back(MediaEvent::Ended);
            }
        }
        self.events.pop_front()
    }
}

// ===== Lifecycle binding
/// The player embedded in an episode detail view.
pub struct PlayerSession {
    media: Box<dyn MediaElement>,
    kind: MediaKind,
    source: String,
    mime_type: String,
    saved_position: Option<f64>,
    last_position: Option<f64>,
}

impl PlayerSession {
    /// Loads the episode into `media`. Returns `None` when the episode has no
    /// audio or video MIME type or no URL.
    pub fn bind(episode: &Episode, factory: &MediaFactory) -> Option<Self> {
        let kind = MediaKind::from_mime(episode.mime_type())?;
        let source = episode.url()?.to_string();
        let mime_type = episode.mime_type().unwrap_or_default().to_string();

        let mut media = factory(kind, episode.total_time());
        media.load(&source, &mime_type);

        Some(Self {
            media,
            kind,
            source,
            mime_type,
            saved_position: episode.current_position(),
            last_position: None,
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_playing(&self) -> bool {
        !self.media.is_paused()
    }

    pub fn position(&self) -> f64 {
        self.media.position()
    }

    pub fn duration(&self) -> Option<f64> {
        self.media.duration()
    }

    /// Position computed at the most recent pause. Kept in memory only.
    pub fn last_position(&self) -> Option<f64> {
        self.last_position
    }

    pub fn position_line(&self) -> String {
        format_position(Some(self.position()), self.duration())
    }

    pub fn toggle(&mut self) {
        if self.media.is_paused() {
            self.media.play();
        } else {
            self.media.pause();
        }
    }

    /// Drains queued media events and returns the notices to send.
    pub fn pump(&mut self) -> Vec<PlaybackNotice> {
        let mut notices = Vec::new();
        while let Some(event) = self.media.poll_event() {
            if let Some(notice) = self.handle_event(event) {
                notices.push(notice);
            }
        }
        notices
    }

    /// Forces the media to pause, whatever state it is in.
    pub fn dismiss(&mut self) -> Vec<PlaybackNotice> {
        debug!("PlayerSession: dismissing {}", self.source);
        self.media.pause();
        self.pump()
    }

    fn handle_event(&mut self, event: MediaEvent) -> Option<PlaybackNotice> {
        trace!("PlayerSession: {:?} for {}", event, self.source);
        match event {
            MediaEvent::MetadataLoaded => {
                if let Some(position) = self.saved_position.filter(|p| p.is_finite() && *p > 0.0) {
                    self.media.seek(position);
                }
                None
            }
            MediaEvent::Play => Some(PlaybackNotice {
                url: Some(self.source.clone()),
                event: PlaybackEventKind::Play,
                position: self.media.position(),
            }),
            MediaEvent::Pause | MediaEvent::Ended => {
                // TODO: persist the position once the save endpoint accepts pause events.
                self.last_position = Some(self.media.position());
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeMediaLog, fake_factory};
    use super::*;
    use std::sync::{Arc, Mutex};

    fn audio_episode() -> Episode {
        Episode::builder()
            .title("Episode")
            .url("http://example.com/ep.mp3")
            .mime_type("audio/mpeg")
            .current_position(42.0)
            .build()
    }

    #[test]
    fn test_no_session_for_other_mime_types() {
        let episode = Episode::builder().url("http://example.com/doc.pdf").mime_type("application/pdf").build();
        assert!(PlayerSession::bind(&episode, &clock_media_factory()).is_none());
    }

    #[test]
    fn test_metadata_loaded_seeks_to_saved_position() {
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let mut session = PlayerSession::bind(&audio_episode(), &fake_factory(log.clone())).unwrap();
        assert_eq!(log.lock().unwrap().loaded.as_deref(), Some("http://example.com/ep.mp3"));

        assert!(session.pump().is_empty());
        assert_eq!(log.lock().unwrap().seeks, vec![42.0]);
    }

    #[test]
    fn test_play_produces_notice_and_pause_records_position() {
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let mut session = PlayerSession::bind(&audio_episode(), &fake_factory(log.clone())).unwrap();
        session.pump();

        session.toggle();
        let notices = session.pump();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].event, PlaybackEventKind::Play);
        assert_eq!(notices[0].position, 42.0);

        session.toggle();
        assert!(session.pump().is_empty());
        assert_eq!(session.last_position(), Some(42.0));
    }

    #[test]
    fn test_dismiss_always_pauses() {
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let mut session = PlayerSession::bind(&audio_episode(), &fake_factory(log.clone())).unwrap();
        session.dismiss();
        assert_eq!(log.lock().unwrap().pause_calls, 1);

        session.toggle();
        session.dismiss();
        let log = log.lock().unwrap();
        assert_eq!(log.pause_calls, 2);
        assert!(!log.playing);
    }

    #[test]
    fn test_clock_media_events() {
        let mut media = ClockMedia::new(Some(100.0));
        media.load("http://example.com/ep.mp3", "audio/mpeg");
        assert_eq!(media.source(), Some("http://example.com/ep.mp3"));
        assert_eq!(media.poll_event(), Some(MediaEvent::MetadataLoaded));

        media.seek(250.0);
        assert_eq!(media.position(), 100.0);
        media.seek(10.0);
        media.play();
        assert_eq!(media.poll_event(), Some(MediaEvent::Play));
        assert!(!media.is_paused());

        media.pause();
        assert_eq!(media.poll_event(), Some(MediaEvent::Pause));
        assert!(media.position() >= 10.0);

        // pausing a paused element queues nothing
        media.pause();
        assert_eq!(media.poll_event(), None);
    }

    #[test]
    fn test_clock_media_ends_at_duration() {
        let mut media = ClockMedia::new(Some(1.0));
        media.load("x", "audio/mpeg");
        assert_eq!(media.poll_event(), Some(MediaEvent::MetadataLoaded));
        media.seek(1.0);
        media.play();
        assert_eq!(media.poll_event(), Some(MediaEvent::Play));
        assert_eq!(media.poll_event(), Some(MediaEvent::Ended));
        assert_eq!(media.poll_event(), None);
        assert!(media.is_paused());
        assert_eq!(media.position(), 1.0);
    }
}
