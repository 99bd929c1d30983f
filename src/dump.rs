// src/dump.rs
use crate::format::{Truncation, format_duration, size_to_human};
use crate::podcast::{Episode, Podcast};
use crate::podcast_fetch::PodcastApi;
use crate::view::entry_list::{EntryList, ListStatus};
use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use log::{info, warn};
use std::io::Write;

const CONCURRENT_EPISODE_REQUESTS: usize = 4;

/// Prints the podcast list, and optionally every podcast's episodes, as plain text.
pub async fn dump(
    api: &dyn PodcastApi,
    with_episodes: bool,
    truncation: Truncation,
    out: &mut impl Write,
) -> Result<()> {
    let podcasts = api.fetch_podcasts().await?;
    info!("dump: {} podcasts", podcasts.len());

    let episode_lists: Vec<Option<EntryList<Episode>>> = if with_episodes {
        stream::iter(podcasts.iter())
            .map(|podcast| async move {
                let mut list = EntryList::new();
                match api.fetch_episodes(podcast.id()).await {
                    Ok(episodes) => list.replace(episodes, truncation, Utc::now()),
                    Err(e) => {
                        warn!("dump: episodes of {} failed: {}", podcast.id(), e);
                        list.fail(e.to_string());
                    }
                }
                Some(list)
            })
            .buffered(CONCURRENT_EPISODE_REQUESTS)
            .collect()
            .await
    } else {
        podcasts.iter().map(|_| None).collect()
    };

    let mut podcast_list: EntryList<Podcast> = EntryList::new();
    podcast_list.replace(podcasts, truncation, Utc::now());

    for (entry, episodes) in podcast_list.entries().iter().zip(episode_lists) {
        writeln!(out, "{}", entry.title)?;
        if !entry.subtitle.is_empty() {
            writeln!(out, "    {}", entry.subtitle)?;
        }
        let Some(episodes) = episodes else { continue };
        if let ListStatus::Failed(message) = episodes.status() {
            writeln!(out, "    ! {}", message)?;
            continue;
        }
        for episode_entry in episodes.entries() {
            let icon = episode_entry.icon.map(|k| k.icon()).unwrap_or(" ");
            let details = episodes
                .record(episode_entry.id)
                .map(episode_details)
                .unwrap_or_default();
            writeln!(out, "  {} {}{}", icon, episode_entry.title, details)?;
        }
    }
    Ok(())
}

fn episode_details(episode: &Episode) -> String {
    let mut parts = Vec::new();
    let duration = format_duration(episode.total_time());
    if !duration.is_empty() {
        parts.push(duration);
    }
    if let Some(size) = episode.file_size().and_then(|bytes| size_to_human(bytes as f64).ok()) {
        parts.push(size);
    }
    if parts.is_empty() { String::new() } else { format!(" ({})", parts.join(", ")) }
}
