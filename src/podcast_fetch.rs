// src/podcast_fetch.rs
use crate::errors::FetchError;
use crate::podcast::{Episode, Podcast, PodcastId};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

const APP_USER_AGENT: &str = concat!("podview/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackEventKind {
    Play,
}

/// Body of the playback notification sent when an episode starts playing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackNotice {
    pub url: Option<String>,
    pub event: PlaybackEventKind,
    pub position: f64,
}

// ===== endpoints
pub fn podcasts_url(base: &Url) -> Result<Url, FetchError> {
    Ok(base.join("json/podcasts.json")?)
}

pub fn episodes_url(base: &Url, podcast: &PodcastId) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(&["json", "podcast", podcast.as_str(), "episodes.json"]);
    Ok(url)
}

pub fn save_url(base: &Url) -> Result<Url, FetchError> {
    Ok(base.join("podcast/save")?)
}

/// Decodes a JSON array, telling broken JSON apart from JSON of the wrong shape.
pub fn decode_list<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<Vec<T>, FetchError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|source| FetchError::MalformedPayload { url: url.to_string(), source })?;
    serde_json::from_value(value)
        .map_err(|source| FetchError::UnexpectedShape { url: url.to_string(), source })
}

// ===== api
#[async_trait]
pub trait PodcastApi: Send + Sync {
    async fn fetch_podcasts(&self) -> Result<Vec<Podcast>, FetchError>;

    async fn fetch_episodes(&self, podcast: &PodcastId) -> Result<Vec<Episode>, FetchError>;

    /// Fire-and-forget from the caller's point of view; the response body is ignored.
    async fn notify_playback(&self, notice: &PlaybackNotice) -> Result<(), FetchError>;
}

// ===== Live http api
pub struct HttpPodcastApi {
    client: Client,
    base: Url,
}

impl HttpPodcastApi {
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        let client: Client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base })
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, FetchError> {
        info!("HttpPodcastApi: fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;
        debug!("HttpPodcastApi: {} returned {} bytes", url, body.len());
        decode_list(url.as_str(), &body)
    }
}

#[async_trait]
impl PodcastApi for HttpPodcastApi {
    async fn fetch_podcasts(&self) -> Result<Vec<Podcast>, FetchError> {
        self.get_list(podcasts_url(&self.base)?).await
    }

    async fn fetch_episodes(&self, podcast: &PodcastId) -> Result<Vec<Episode>, FetchError> {
        self.get_list(episodes_url(&self.base, podcast)?).await
    }

    async fn notify_playback(&self, notice: &PlaybackNotice) -> Result<(), FetchError> {
        let url = save_url(&self.base)?;
        debug!("HttpPodcastApi: posting playback notice to {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(notice)
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
