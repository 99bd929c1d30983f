// src/event.rs
use crate::errors::FetchError;
use crate::podcast::{Episode, Podcast};
use chrono::{DateTime, Utc};

/// Completions posted back to the UI loop by background requests.
///
/// `generation` identifies the request that produced the event; the view
/// controller drops events from requests that have since been superseded.
#[derive(Debug)]
pub enum AppEvent {
    PodcastsLoaded {
        generation: u64,
        result: Result<Vec<Podcast>, FetchError>,
        timestamp: DateTime<Utc>,
    },
    EpisodesLoaded {
        generation: u64,
        podcast: Podcast,
        result: Result<Vec<Episode>, FetchError>,
        timestamp: DateTime<Utc>,
    },
}
