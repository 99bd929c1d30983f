// src/view/selection.rs
use crate::view::entry_list::EntryId;

/// The currently selected podcast and episode entries.
///
/// Each new selection overwrites the previous one, so at most one entry of
/// each kind carries the selected marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    podcast: Option<EntryId>,
    episode: Option<EntryId>,
}

impl Selection {
    pub fn podcast(&self) -> Option<EntryId> {
        self.podcast
    }

    pub fn episode(&self) -> Option<EntryId> {
        self.episode
    }

    pub fn select_podcast(&mut self, id: EntryId) {
        self.podcast = Some(id);
    }

    pub fn select_episode(&mut self, id: EntryId) {
        self.episode = Some(id);
    }

    pub fn clear_podcast(&mut self) {
        self.podcast = None;
    }

    pub fn clear_episode(&mut self) {
        self.episode = None;
    }

    pub fn is_podcast_selected(&self, id: EntryId) -> bool {
        self.podcast == Some(id)
    }

    pub fn is_episode_selected(&self, id: EntryId) -> bool {
        self.episode == Some(id)
    }
}
