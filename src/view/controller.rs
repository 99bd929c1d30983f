// src/view/controller.rs
use crate::event::AppEvent;
use crate::format::Truncation;
use crate::player::MediaFactory;
use crate::podcast::{Episode, Podcast};
use crate::podcast_fetch::{PlaybackNotice, PodcastApi};
use crate::view::detail::DetailView;
use crate::view::entry_list::{EntryId, EntryList, UNTITLED};
use crate::view::selection::Selection;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Drives fetch, render and select for podcasts and their episodes, and owns
/// the player of the episode detail view.
///
/// Requests run as tokio tasks and report back through `events`; the owner
/// feeds those events to [`ViewController::handle_event`] on its own loop.
pub struct ViewController {
    api: Arc<dyn PodcastApi>,
    events: UnboundedSender<AppEvent>,
    media_factory: MediaFactory,
    truncation: Truncation,
    podcasts: EntryList<Podcast>,
    episodes: EntryList<Episode>,
    selection: Selection,
    episode_header: Option<String>,
    detail: Option<DetailView>,
    podcasts_generation: u64,
    episodes_generation: u64,
}

impl ViewController {
    pub fn new(
        api: Arc<dyn PodcastApi>,
        events: UnboundedSender<AppEvent>,
        media_factory: MediaFactory,
        truncation: Truncation,
    ) -> Self {
        Self {
            api,
            events,
            media_factory,
            truncation,
            podcasts: EntryList::new(),
            episodes: EntryList::new(),
            selection: Selection::default(),
            episode_header: None,
            detail: None,
            podcasts_generation: 0,
            episodes_generation: 0,
        }
    }

    // ======================================= Listing =============================================

    /// Starts loading the podcast list. Any earlier request still in flight is superseded.
    pub fn list_podcasts(&mut self) {
        self.podcasts_generation += 1;
        let generation = self.podcasts_generation;
        self.podcasts.set_loading();

        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_podcasts().await;
            let event = AppEvent::PodcastsLoaded { generation, result, timestamp: Utc::now() };
            if events.send(event).is_err() {
                debug!("ViewController: podcast list arrived after shutdown");
            }
        });
    }

    /// Starts loading the episodes of `podcast`, superseding any earlier episode request.
    pub fn list_episodes(&mut self, podcast: Podcast) {
        self.episodes_generation += 1;
        let generation = self.episodes_generation;
        self.episodes.set_loading();

        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_episodes(podcast.id()).await;
            let event =
                AppEvent::EpisodesLoaded { generation, podcast, result, timestamp: Utc::now() };
            if events.send(event).is_err() {
                debug!("ViewController: episode list arrived after shutdown");
            }
        });
    }

    /// Applies a completed request. Returns `false` if the event was stale and dropped.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::PodcastsLoaded { generation, result, timestamp } => {
                if generation != self.podcasts_generation {
                    debug!("ViewController: dropping stale podcast list #{}", generation);
                    return false;
                }
                let selected = self.selected_podcast().map(|p| p.id().clone());
                match result {
                    Ok(podcasts) => {
                        info!("ViewController: {} podcasts loaded", podcasts.len());
                        self.podcasts.replace(podcasts, self.truncation, timestamp);
                    }
                    Err(e) => {
                        warn!("ViewController: podcast list failed: {}", e);
                        self.podcasts.fail(format!("{}: {}", e.kind(), e));
                    }
                }
                // Entries were re-rendered under new ids; follow the podcast itself.
                if let Some(podcast_id) = selected {
                    match self.podcasts.find(|p| p.id() == &podcast_id) {
                        Some(id) => self.selection.select_podcast(id),
                        None => {
                            debug!("ViewController: selected podcast {} is gone", podcast_id);
                            self.selection.clear_podcast();
                        }
                    }
                }
                true
            }
            AppEvent::EpisodesLoaded { generation, podcast, result, timestamp } => {
                if generation != self.episodes_generation {
                    debug!(
                        "ViewController: dropping stale episode list #{} for {}",
                        generation,
                        podcast.id()
                    );
                    return false;
                }
                self.episode_header = Some(podcast.title().unwrap_or(UNTITLED).to_string());
                match result {
                    Ok(episodes) => {
                        info!("ViewController: {} episodes loaded for {}", episodes.len(), podcast.id());
                        self.episodes.replace(episodes, self.truncation, timestamp);
                    }
                    Err(e) => {
                        warn!("ViewController: episode list for {} failed: {}", podcast.id(), e);
                        self.episodes.fail(format!("{}: {}", e.kind(), e));
                    }
                }
                self.selection.clear_episode();
                true
            }
        }
    }

    // ====================================== Selection ============================================

    /// Marks the podcast entry as selected and loads its episodes.
    pub fn select_podcast(&mut self, id: EntryId) -> bool {
        let Some(podcast) = self.podcasts.record(id).cloned() else {
            warn!("ViewController: no podcast behind entry {}", id);
            return false;
        };
        debug!("ViewController: podcast {} selected", podcast.id());
        self.selection.select_podcast(id);
        self.list_episodes(podcast);
        true
    }

    /// Marks the episode entry as selected and opens its detail view, closing
    /// the previous one.
    pub fn select_episode(&mut self, id: EntryId) -> bool {
        let Some(episode) = self.episodes.record(id).cloned() else {
            warn!("ViewController: no episode behind entry {}", id);
            return false;
        };
        self.selection.select_episode(id);
        self.close_detail();

        let detail = DetailView::build(id, episode, &self.media_factory);
        if !detail.missing().is_empty() {
            info!("ViewController: episode {} lacks {:?}", id, detail.missing());
        }
        self.detail = Some(detail);
        self.pump_player();
        true
    }

    /// Dismisses the detail view. Its player is paused whatever state it is in.
    pub fn close_detail(&mut self) {
        if let Some(detail) = self.detail.take() {
            debug!("ViewController: closing detail for {}", detail.entry());
            let notices = detail.close();
            self.send_notices(notices);
        }
    }

    // ======================================= Player ==============================================

    pub fn toggle_playback(&mut self) {
        if let Some(player) = self.detail.as_mut().and_then(DetailView::player_mut) {
            player.toggle();
        }
        self.pump_player();
    }

    /// Dispatches queued media events to the player bindings.
    pub fn pump_player(&mut self) {
        let notices = match self.detail.as_mut().and_then(DetailView::player_mut) {
            Some(player) => player.pump(),
            None => return,
        };
        self.send_notices(notices);
    }

    fn send_notices(&self, notices: Vec<PlaybackNotice>) {
        for notice in notices {
            let api = self.api.clone();
            tokio::spawn(async move {
                if let Err(e) = api.notify_playback(&notice).await {
                    debug!("ViewController: playback notice not delivered: {}", e);
                }
            });
        }
    }

    // ====================================== Accessors ============================================

    pub fn podcasts(&self) -> &EntryList<Podcast> {
        &self.podcasts
    }

    pub fn episodes(&self) -> &EntryList<Episode> {
        &self.episodes
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn episode_header(&self) -> Option<&str> {
        self.episode_header.as_deref()
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn selected_podcast(&self) -> Option<&Podcast> {
        self.selection.podcast().and_then(|id| self.podcasts.record(id))
    }

    /// Reloads the episodes of the selected podcast.
    pub fn reload_episodes(&mut self) -> bool {
        match self.selected_podcast().cloned() {
            Some(podcast) => {
                self.list_episodes(podcast);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::fake::{FakeMediaLog, fake_factory};
    use crate::podcast::PodcastId;
    use crate::podcast_fetch::PlaybackEventKind;
    use crate::format::MediaKind;
    use crate::podcast_fetch::fake::FakeApi;
    use crate::view::entry_list::ListStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn podcast(id: &str, title: &str) -> Podcast {
        Podcast::new(PodcastId::new(id), Some(title.to_string()), Some("desc".to_string()), None)
    }

    fn audio_episode(title: &str) -> Episode {
        Episode::builder()
            .title(title)
            .url(&format!("http://example.com/{}.mp3", title))
            .mime_type("audio/mpeg")
            .current_position(30.0)
            .build()
    }

    fn fake_api() -> Arc<FakeApi> {
        let mut episodes = HashMap::new();
        episodes.insert(PodcastId::new("a"), vec![audio_episode("a1"), audio_episode("a2")]);
        episodes.insert(PodcastId::new("b"), vec![audio_episode("b1")]);
        Arc::new(FakeApi {
            podcasts: vec![podcast("a", "Podcast A"), podcast("b", "Podcast B")],
            episodes,
            ..Default::default()
        })
    }

    fn controller(
        api: Arc<FakeApi>,
        log: Arc<Mutex<FakeMediaLog>>,
    ) -> (ViewController, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ViewController::new(api, tx, fake_factory(log), Truncation::Off), rx)
    }

    async fn apply_next(ctrl: &mut ViewController, rx: &mut UnboundedReceiver<AppEvent>) -> bool {
        let event = rx.recv().await.unwrap();
        ctrl.handle_event(event)
    }

    #[tokio::test]
    async fn test_list_podcasts_renders_in_order() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        assert_eq!(ctrl.podcasts().status(), &ListStatus::Loading);
        assert!(apply_next(&mut ctrl, &mut rx).await);

        let titles: Vec<&str> = ctrl.podcasts().entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Podcast A", "Podcast B"]);
        let id = ctrl.podcasts().id_at(1).unwrap();
        assert_eq!(ctrl.podcasts().record(id), Some(&podcast("b", "Podcast B")));
    }

    #[tokio::test]
    async fn test_failed_list_is_visible_and_empty() {
        let api = Arc::new(FakeApi { fail_with_status: Some(503), ..Default::default() });
        let (mut ctrl, mut rx) = controller(api, Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;

        assert!(ctrl.podcasts().is_empty());
        match ctrl.podcasts().status() {
            ListStatus::Failed(message) => assert!(message.contains("503")),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_select_podcast_sets_header_and_episodes() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;

        let a = ctrl.podcasts().id_at(0).unwrap();
        assert!(ctrl.select_podcast(a));
        assert!(ctrl.selection().is_podcast_selected(a));
        assert_eq!(ctrl.episodes().status(), &ListStatus::Loading);

        apply_next(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.episode_header(), Some("Podcast A"));
        assert_eq!(ctrl.episodes().len(), 2);
    }

    #[tokio::test]
    async fn test_only_one_podcast_marked_selected() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;

        let a = ctrl.podcasts().id_at(0).unwrap();
        let b = ctrl.podcasts().id_at(1).unwrap();
        ctrl.select_podcast(a);
        ctrl.select_podcast(b);

        let marked: Vec<EntryId> = ctrl
            .podcasts()
            .entries()
            .iter()
            .map(|e| e.id)
            .filter(|id| ctrl.selection().is_podcast_selected(*id))
            .collect();
        assert_eq!(marked, vec![b]);
    }

    #[tokio::test]
    async fn test_stale_episode_list_is_dropped() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;

        let a = ctrl.podcasts().id_at(0).unwrap();
        let b = ctrl.podcasts().id_at(1).unwrap();
        ctrl.select_podcast(a);
        ctrl.select_podcast(b);

        let mut pending = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        // deliver the newer response first, then the older one
        pending.sort_by_key(|e| match e {
            AppEvent::EpisodesLoaded { generation, .. } => std::cmp::Reverse(*generation),
            AppEvent::PodcastsLoaded { generation, .. } => std::cmp::Reverse(*generation),
        });
        let mut applied = pending.into_iter().map(|e| ctrl.handle_event(e));
        assert_eq!(applied.next(), Some(true));
        assert_eq!(applied.next(), Some(false));
        drop(applied);

        assert_eq!(ctrl.episode_header(), Some("Podcast B"));
        let titles: Vec<&str> = ctrl.episodes().entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["b1"]);
    }

    #[tokio::test]
    async fn test_select_episode_opens_detail_and_seeks() {
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let (mut ctrl, mut rx) = controller(fake_api(), log.clone());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(0).unwrap());
        apply_next(&mut ctrl, &mut rx).await;

        let ep = ctrl.episodes().id_at(1).unwrap();
        assert!(ctrl.select_episode(ep));
        assert!(ctrl.selection().is_episode_selected(ep));

        let detail = ctrl.detail().unwrap();
        assert_eq!(detail.title(), "a2");
        assert_eq!(detail.entry(), ep);
        assert_eq!(log.lock().unwrap().loaded.as_deref(), Some("http://example.com/a2.mp3"));
        assert_eq!(log.lock().unwrap().seeks, vec![30.0]);
    }

    #[tokio::test]
    async fn test_play_notifies_and_close_pauses() {
        let api = fake_api();
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let (mut ctrl, mut rx) = controller(api.clone(), log.clone());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(1).unwrap());
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_episode(ctrl.episodes().id_at(0).unwrap());

        ctrl.toggle_playback();
        assert!(log.lock().unwrap().playing);

        ctrl.close_detail();
        assert!(ctrl.detail().is_none());
        assert!(!log.lock().unwrap().playing);
        assert_eq!(log.lock().unwrap().pause_calls, 1);

        // the notice is sent from a spawned task
        for _ in 0..50 {
            if !api.recorded_notices().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let notices = api.recorded_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].event, PlaybackEventKind::Play);
        assert_eq!(notices[0].url.as_deref(), Some("http://example.com/b1.mp3"));
    }

    #[tokio::test]
    async fn test_close_detail_pauses_even_when_paused() {
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let (mut ctrl, mut rx) = controller(fake_api(), log.clone());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(1).unwrap());
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_episode(ctrl.episodes().id_at(0).unwrap());

        ctrl.close_detail();
        assert_eq!(log.lock().unwrap().pause_calls, 1);
    }

    #[tokio::test]
    async fn test_new_episode_list_clears_episode_selection() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(0).unwrap());
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_episode(ctrl.episodes().id_at(0).unwrap());
        assert!(ctrl.selection().episode().is_some());

        assert!(ctrl.reload_episodes());
        apply_next(&mut ctrl, &mut rx).await;
        assert!(ctrl.selection().episode().is_none());
        // the detail view stays open until dismissed
        assert!(ctrl.detail().is_some());
    }

    #[tokio::test]
    async fn test_unknown_entry_is_ignored() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        let stale = ctrl.podcasts().id_at(0).unwrap();
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;

        assert!(!ctrl.select_podcast(stale));
        assert!(!ctrl.select_episode(stale));
    }

    #[tokio::test]
    async fn test_podcast_entry_does_not_open_an_episode() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        let a = ctrl.podcasts().id_at(0).unwrap();
        ctrl.select_podcast(a);
        apply_next(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.episodes().len(), 2);

        assert!(!ctrl.select_episode(a));
        assert!(ctrl.detail().is_none());
        assert!(ctrl.selection().episode().is_none());
    }

    #[tokio::test]
    async fn test_podcast_reload_keeps_selection() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(0).unwrap());
        apply_next(&mut ctrl, &mut rx).await;

        ctrl.list_podcasts();
        assert!(apply_next(&mut ctrl, &mut rx).await);

        let reselected = ctrl.podcasts().id_at(0).unwrap();
        assert!(ctrl.selection().is_podcast_selected(reselected));
        assert_eq!(ctrl.selected_podcast().map(|p| p.id().as_str()), Some("a"));
        assert_eq!(ctrl.episode_header(), Some("Podcast A"));

        assert!(ctrl.reload_episodes());
        match rx.recv().await.unwrap() {
            AppEvent::EpisodesLoaded { podcast, .. } => assert_eq!(podcast.id().as_str(), "a"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_podcast_reload_drops_vanished_selection() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(1).unwrap());
        apply_next(&mut ctrl, &mut rx).await;

        // the server no longer lists podcast b
        let event = AppEvent::PodcastsLoaded {
            generation: 1,
            result: Ok(vec![podcast("a", "Podcast A")]),
            timestamp: Utc::now(),
        };
        assert!(ctrl.handle_event(event));
        assert!(ctrl.selection().podcast().is_none());
        assert!(!ctrl.reload_episodes());
    }

    #[tokio::test]
    async fn test_stale_podcast_list_is_dropped() {
        let (mut ctrl, mut rx) = controller(fake_api(), Arc::default());
        ctrl.list_podcasts();
        ctrl.list_podcasts();

        let mut pending = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        pending.sort_by_key(|e| match e {
            AppEvent::PodcastsLoaded { generation, .. } => *generation,
            AppEvent::EpisodesLoaded { generation, .. } => *generation,
        });
        let older = pending.remove(0);
        let newer = pending.remove(0);

        assert!(ctrl.handle_event(newer));
        let ids: Vec<EntryId> = ctrl.podcasts().entries().iter().map(|e| e.id).collect();
        assert!(!ctrl.handle_event(older));
        let after: Vec<EntryId> = ctrl.podcasts().entries().iter().map(|e| e.id).collect();
        assert_eq!(after, ids);
        assert_eq!(ctrl.podcasts().len(), 2);
    }

    #[tokio::test]
    async fn test_video_episode_gets_video_player() {
        let mut episodes = HashMap::new();
        episodes.insert(
            PodcastId::new("v"),
            vec![
                Episode::builder()
                    .title("clip")
                    .url("http://example.com/clip.mp4")
                    .mime_type("video/mp4")
                    .build(),
            ],
        );
        let api = Arc::new(FakeApi {
            podcasts: vec![podcast("v", "Video cast")],
            episodes,
            ..Default::default()
        });
        let log = Arc::new(Mutex::new(FakeMediaLog::default()));
        let (mut ctrl, mut rx) = controller(api, log.clone());
        ctrl.list_podcasts();
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_podcast(ctrl.podcasts().id_at(0).unwrap());
        apply_next(&mut ctrl, &mut rx).await;
        ctrl.select_episode(ctrl.episodes().id_at(0).unwrap());

        let player = ctrl.detail().and_then(DetailView::player).unwrap();
        assert_eq!(player.kind(), MediaKind::Video);
        assert_eq!(player.mime_type(), "video/mp4");
        assert_eq!(log.lock().unwrap().loaded.as_deref(), Some("http://example.com/clip.mp4"));
    }
}
