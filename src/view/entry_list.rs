// src/view/entry_list.rs
use crate::format::{MediaKind, Truncation, first_line};
use crate::podcast::{Episode, Podcast};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub const UNTITLED: &str = "(untitled)";

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies one rendered entry. Ids come from one process-wide counter and
/// are never reused, so an id resolves in at most one list and an id from a
/// replaced list no longer resolves at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a record exposes to the list renderer.
pub trait Renderable {
    fn title(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn mime_type(&self) -> Option<&str> {
        None
    }
}

impl Renderable for Podcast {
    fn title(&self) -> Option<&str> {
        Podcast::title(self)
    }

    fn description(&self) -> Option<&str> {
        Podcast::description(self)
    }
}

impl Renderable for Episode {
    fn title(&self) -> Option<&str> {
        Episode::title(self)
    }

    fn description(&self) -> Option<&str> {
        Episode::description(self)
    }

    fn mime_type(&self) -> Option<&str> {
        Episode::mime_type(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub subtitle: String,
    pub icon: Option<MediaKind>,
    /// Fields the record lacked when it was rendered.
    pub missing: Vec<&'static str>,
}

pub fn render<R: Renderable>(id: EntryId, record: &R, truncation: Truncation) -> Entry {
    let mut missing = Vec::new();

    let title = match record.title().filter(|t| !t.trim().is_empty()) {
        Some(title) => truncation.apply(title.trim()).into_owned(),
        None => {
            missing.push("title");
            UNTITLED.to_string()
        }
    };
    let subtitle = match record.description() {
        Some(description) => truncation.apply(&first_line(description)).into_owned(),
        None => {
            missing.push("description");
            String::new()
        }
    };

    Entry { id, title, subtitle, icon: MediaKind::from_mime(record.mime_type()), missing }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Loaded(DateTime<Utc>),
    Failed(String),
}

/// Rendered entries plus the typed records behind them.
#[derive(Debug)]
pub struct EntryList<T> {
    entries: Vec<Entry>,
    records: HashMap<EntryId, T>,
    status: ListStatus,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), records: HashMap::new(), status: ListStatus::Idle }
    }
}

impl<T: Renderable> EntryList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the list and renders one entry per record, in the given order.
    pub fn replace(&mut self, records: Vec<T>, truncation: Truncation, loaded_at: DateTime<Utc>) {
        self.clear();
        for record in records {
            let id = EntryId::next();
            self.entries.push(render(id, &record, truncation));
            self.records.insert(id, record);
        }
        self.status = ListStatus::Loaded(loaded_at);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.records.clear();
        self.status = ListStatus::Idle;
    }

    pub fn set_loading(&mut self) {
        self.status = ListStatus::Loading;
    }

    /// Leaves the list empty and remembers why.
    pub fn fail(&mut self, message: String) {
        self.clear();
        self.status = ListStatus::Failed(message);
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&self, id: EntryId) -> Option<&T> {
        self.records.get(&id)
    }

    /// First entry, in list order, whose record matches.
    pub fn find(&self, matches: impl Fn(&T) -> bool) -> Option<EntryId> {
        self.entries
            .iter()
            .map(|e| e.id)
            .find(|id| self.records.get(id).is_some_and(&matches))
    }

    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}
