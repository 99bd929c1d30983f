// src/podcast.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// === PODCAST STRUCTURES ===
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PodcastId(String);

impl fmt::Display for PodcastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PodcastId {
    pub fn new(s: &str) -> Self {
        PodcastId(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PodcastId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// The server emits database ids as numbers; accept strings too.
impl<'de> Deserialize<'de> for PodcastId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => PodcastId(n.to_string()),
            RawId::Text(s) => PodcastId(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podcast {
    #[serde(rename = "id")]
    id: PodcastId,
    #[serde(rename = "title", default)]
    title: Option<String>,
    #[serde(rename = "description", default)]
    description: Option<String>,
    #[serde(rename = "cover_url", default)]
    cover_url: Option<String>,
}

impl Podcast {
    pub fn new(
        id: PodcastId,
        title: Option<String>,
        description: Option<String>,
        cover_url: Option<String>,
    ) -> Self {
        Self { id, title, description, cover_url }
    }

    pub fn id(&self) -> &PodcastId {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Episode {
    #[serde(rename = "title", default)]
    title: Option<String>,
    #[serde(rename = "description", default)]
    description: Option<String>,
    #[serde(rename = "url", default)]
    url: Option<String>,
    #[serde(rename = "mime_type", default)]
    mime_type: Option<String>,
    /// Release time in seconds since the Unix epoch.
    #[serde(rename = "published", default)]
    published: Option<i64>,
    #[serde(rename = "file_size", default)]
    file_size: Option<i64>,
    #[serde(rename = "link", default)]
    link: Option<String>,
    /// Saved playback position in seconds.
    #[serde(rename = "current_position", default)]
    current_position: Option<f64>,
    #[serde(rename = "total_time", default)]
    total_time: Option<f64>,
}

impl Episode {
    #[cfg(test)]
    pub fn builder() -> EpisodeBuilder {
        EpisodeBuilder::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn published(&self) -> Option<i64> {
        self.published
    }

    pub fn file_size(&self) -> Option<i64> {
        self.file_size
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn current_position(&self) -> Option<f64> {
        self.current_position
    }

    pub fn total_time(&self) -> Option<f64> {
        self.total_time
    }
}

/// Builder for episodes, so tests can assemble records without a JSON payload.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct EpisodeBuilder {
    episode: Episode,
}

#[cfg(test)]
impl EpisodeBuilder {
    pub fn title(mut self, title: &str) -> Self {
        self.episode.title = Some(title.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.episode.description = Some(description.to_string());
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.episode.url = Some(url.to_string());
        self
    }

    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.episode.mime_type = Some(mime_type.to_string());
        self
    }

    pub fn published(mut self, epoch_seconds: i64) -> Self {
        self.episode.published = Some(epoch_seconds);
        self
    }

    pub fn file_size(mut self, bytes: i64) -> Self {
        self.episode.file_size = Some(bytes);
        self
    }

    pub fn link(mut self, link: &str) -> Self {
        self.episode.link = Some(link.to_string());
        self
    }

    pub fn current_position(mut self, seconds: f64) -> Self {
        self.episode.current_position = Some(seconds);
        self
    }

    pub fn total_time(mut self, seconds: f64) -> Self {
        self.episode.total_time = Some(seconds);
        self
    }

    pub fn build(self) -> Episode {
        self.episode
    }
}
