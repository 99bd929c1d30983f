// src/view/detail.rs
use crate::format::{format_description, release_date_line, size_to_human};
use crate::player::{MediaFactory, PlayerSession};
use crate::podcast::Episode;
use crate::podcast_fetch::PlaybackNotice;
use crate::view::entry_list::{EntryId, UNTITLED};
use log::warn;

/// Detail panel for the selected episode, with its embedded player if any.
pub struct DetailView {
    entry: EntryId,
    title: String,
    description: String,
    release_line: Option<String>,
    size: String,
    link: Option<String>,
    player: Option<PlayerSession>,
    missing: Vec<&'static str>,
}

impl DetailView {
    pub fn build(entry: EntryId, episode: Episode, factory: &MediaFactory) -> Self {
        let mut missing = Vec::new();

        let title = match episode.title() {
            Some(title) => title.to_string(),
            None => {
                missing.push("title");
                UNTITLED.to_string()
            }
        };
        if episode.description().is_none() {
            missing.push("description");
        }
        let description = format_description(episode.description());

        let release_line = match episode.published() {
            Some(published) => release_date_line(published),
            None => {
                missing.push("published");
                None
            }
        };

        let size = match episode.file_size() {
            Some(bytes) => size_to_human(bytes as f64).unwrap_or_else(|e| {
                warn!("DetailView: {} for '{}'", e, title);
                "invalid size".to_string()
            }),
            None => {
                missing.push("file_size");
                "n/a".to_string()
            }
        };

        let link = episode.link().map(String::from);
        if link.is_none() {
            missing.push("link");
        }

        let player = PlayerSession::bind(&episode, factory);
        if player.is_none() && episode.url().is_none() {
            missing.push("url");
        }

        Self { entry, title, description, release_line, size, link, player, missing }
    }

    pub fn entry(&self) -> EntryId {
        self.entry
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn release_line(&self) -> Option<&str> {
        self.release_line.as_deref()
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn player(&self) -> Option<&PlayerSession> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerSession> {
        self.player.as_mut()
    }

    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    /// Tears the view down, pausing its player.
    pub fn close(mut self) -> Vec<PlaybackNotice> {
        match self.player.as_mut() {
            Some(player) => player.dismiss(),
            None => Vec::new(),
        }
    }
}
