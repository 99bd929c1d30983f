use crate::event::AppEvent;
use crate::theme::Theme;
use crate::view::controller::ViewController;
use crate::widgets::scrollable_paragraph::ScrollableParagraphState;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::Backend};
use std::io;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum FocusedPanel {
    #[default]
    Podcasts,
    Episodes,
    Details,
}

pub struct App {
    pub should_quit: bool,
    pub controller: ViewController,
    pub theme: Theme,
    pub focused_panel: FocusedPanel,
    /// Highlighted row in each list; selection only changes on Enter.
    pub podcast_cursor: usize,
    pub episode_cursor: usize,
    pub details_state: ScrollableParagraphState,
}

impl App {
    pub fn new(controller: ViewController, theme: Theme) -> App {
        App {
            should_quit: false,
            controller,
            theme,
            focused_panel: FocusedPanel::default(),
            podcast_cursor: 0,
            episode_cursor: 0,
            details_state: ScrollableParagraphState::default(),
        }
    }

    // =================================== Update details =========================================

    fn update_details_content(&mut self) {
        let content = match self.controller.detail() {
            Some(detail) => detail.description().to_string(),
            None if self.controller.selected_podcast().is_some() => {
                "Select an episode to see its details.".to_string()
            }
            None => "Select a podcast and then an episode to see details.".to_string(),
        };
        self.details_state.set_content(content);
    }

    /// Applies finished requests and advances the player.
    pub fn on_app_event(&mut self, event: AppEvent) {
        let podcasts_reloaded = matches!(event, AppEvent::PodcastsLoaded { .. });
        if self.controller.handle_event(event) {
            let podcasts = self.controller.podcasts();
            let selected_row = self.controller.selection().podcast().and_then(|id| podcasts.position(id));
            self.podcast_cursor = match selected_row {
                Some(row) if podcasts_reloaded => row,
                _ => clamp_cursor(self.podcast_cursor, podcasts.len()),
            };
            self.episode_cursor = clamp_cursor(self.episode_cursor, self.controller.episodes().len());
        }
    }

    pub fn on_tick(&mut self) {
        self.controller.pump_player();
        self.update_details_content();
    }

    // --- Navigation methods for focused panel ---
    pub fn focus_next_panel(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Podcasts => FocusedPanel::Episodes,
            FocusedPanel::Episodes => FocusedPanel::Details,
            FocusedPanel::Details => FocusedPanel::Podcasts,
        };
    }

    pub fn focus_prev_panel(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Podcasts => FocusedPanel::Details,
            FocusedPanel::Episodes => FocusedPanel::Podcasts,
            FocusedPanel::Details => FocusedPanel::Episodes,
        };
    }

    // ============================= Moving the cursor in the lists ================================
    pub fn cursor_down(&mut self) {
        match self.focused_panel {
            FocusedPanel::Podcasts => {
                self.podcast_cursor = next_index(self.podcast_cursor, self.controller.podcasts().len())
            }
            FocusedPanel::Episodes => {
                self.episode_cursor = next_index(self.episode_cursor, self.controller.episodes().len())
            }
            FocusedPanel::Details => self.details_state.scroll_down(1),
        }
    }

    pub fn cursor_up(&mut self) {
        match self.focused_panel {
            FocusedPanel::Podcasts => {
                self.podcast_cursor = prev_index(self.podcast_cursor, self.controller.podcasts().len())
            }
            FocusedPanel::Episodes => {
                self.episode_cursor = prev_index(self.episode_cursor, self.controller.episodes().len())
            }
            FocusedPanel::Details => self.details_state.scroll_up(1),
        }
    }

    // ====================================== Selecting ============================================
    pub fn activate(&mut self) {
        match self.focused_panel {
            FocusedPanel::Podcasts => {
                if let Some(id) = self.controller.podcasts().id_at(self.podcast_cursor) {
                    if self.controller.select_podcast(id) {
                        self.episode_cursor = 0;
                        self.focused_panel = FocusedPanel::Episodes;
                    }
                }
            }
            FocusedPanel::Episodes => {
                if let Some(id) = self.controller.episodes().id_at(self.episode_cursor) {
                    if self.controller.select_episode(id) {
                        self.focused_panel = FocusedPanel::Details;
                    }
                }
            }
            FocusedPanel::Details => self.controller.toggle_playback(),
        }
        self.update_details_content();
    }

    pub fn reload(&mut self) {
        match self.focused_panel {
            FocusedPanel::Podcasts => self.controller.list_podcasts(),
            FocusedPanel::Episodes | FocusedPanel::Details => {
                if !self.controller.reload_episodes() {
                    self.controller.list_podcasts();
                }
            }
        }
    }

    pub fn close_details(&mut self) {
        self.controller.close_detail();
        if self.focused_panel == FocusedPanel::Details {
            self.focused_panel = FocusedPanel::Episodes;
        }
        self.update_details_content();
    }

    // --- Key Handler ---
    pub fn on_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => {
                self.controller.close_detail();
                self.should_quit = true;
            }
            KeyCode::Down | KeyCode::Char('j') => self.cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => self.cursor_up(),
            KeyCode::PageDown if self.focused_panel == FocusedPanel::Details => {
                self.details_state.scroll_down(self.details_state.page_size())
            }
            KeyCode::PageUp if self.focused_panel == FocusedPanel::Details => {
                self.details_state.scroll_up(self.details_state.page_size())
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Char(' ') => self.controller.toggle_playback(),
            KeyCode::Esc => self.close_details(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Right | KeyCode::Tab => self.focus_next_panel(),
            KeyCode::Left | KeyCode::BackTab => self.focus_prev_panel(),
            _ => {}
        }
    }
}

fn next_index(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

fn prev_index(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + len - 1) % len }
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

pub fn start_ui(mut app: App, events: UnboundedReceiver<AppEvent>) -> Result<()> {
    // Set up the terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.controller.list_podcasts();
    let res = run_app_loop(&mut terminal, &mut app, events);

    // Restore the terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!("UI loop stopped: {}", e);
    }
    info!("UI closed");
    res
}

pub fn run_app_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let tick = app.theme.quick();
    while !app.should_quit {
        while let Ok(app_event) = events.try_recv() {
            app.on_app_event(app_event);
        }
        app.on_tick();

        let frame_size = terminal.get_frame().size();
        crate::terminal_ui::prepare_ui_layout(app, frame_size);
        terminal.draw(|f| crate::terminal_ui::ui(f, app))?;

        if event::poll(tick)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    app.on_key(key_event.code);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Truncation;
    use crate::player::clock_media_factory;
    use crate::podcast::{Episode, Podcast, PodcastId};
    use crate::podcast_fetch::fake::FakeApi;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app_with_data() -> (App, UnboundedReceiver<AppEvent>) {
        let mut episodes = HashMap::new();
        episodes.insert(
            PodcastId::new("1"),
            vec![
                Episode::builder().title("One").url("http://e/1.mp3").mime_type("audio/mpeg").build(),
                Episode::builder().title("Two").build(),
            ],
        );
        let api = Arc::new(FakeApi {
            podcasts: vec![
                Podcast::new(PodcastId::new("1"), Some("First".into()), None, None),
                Podcast::new(PodcastId::new("2"), Some("Second".into()), None, None),
            ],
            episodes,
            ..Default::default()
        });
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = ViewController::new(api, tx, clock_media_factory(), Truncation::Off);
        (App::new(controller, Theme::default()), rx)
    }

    #[tokio::test]
    async fn test_enter_walks_down_the_hierarchy() {
        let (mut app, mut rx) = app_with_data();
        app.controller.list_podcasts();
        app.on_app_event(rx.recv().await.unwrap());

        app.on_key(KeyCode::Enter);
        assert_eq!(app.focused_panel, FocusedPanel::Episodes);
        app.on_app_event(rx.recv().await.unwrap());
        assert_eq!(app.controller.episodes().len(), 2);

        app.on_key(KeyCode::Enter);
        assert_eq!(app.focused_panel, FocusedPanel::Details);
        assert_eq!(app.controller.detail().map(|d| d.title()), Some("One"));

        app.on_key(KeyCode::Esc);
        assert!(app.controller.detail().is_none());
        assert_eq!(app.focused_panel, FocusedPanel::Episodes);
    }

    #[tokio::test]
    async fn test_reload_keeps_cursor_on_selected_podcast() {
        let (mut app, mut rx) = app_with_data();
        app.controller.list_podcasts();
        app.on_app_event(rx.recv().await.unwrap());
        app.on_key(KeyCode::Down);
        app.on_key(KeyCode::Enter);
        app.on_app_event(rx.recv().await.unwrap());

        app.focused_panel = FocusedPanel::Podcasts;
        app.on_key(KeyCode::Up);
        app.on_key(KeyCode::Char('r'));
        app.on_app_event(rx.recv().await.unwrap());

        assert_eq!(app.podcast_cursor, 1);
        assert_eq!(app.controller.selected_podcast().map(|p| p.id().as_str()), Some("2"));
    }

    #[tokio::test]
    async fn test_cursor_wraps_and_does_not_select() {
        let (mut app, mut rx) = app_with_data();
        app.controller.list_podcasts();
        app.on_app_event(rx.recv().await.unwrap());

        app.on_key(KeyCode::Up);
        assert_eq!(app.podcast_cursor, 1);
        app.on_key(KeyCode::Down);
        assert_eq!(app.podcast_cursor, 0);
        assert!(app.controller.selection().podcast().is_none());
    }

    #[test]
    fn test_focus_cycles() {
        let (mut app, _rx) = app_with_data();
        app.on_key(KeyCode::Tab);
        app.on_key(KeyCode::Tab);
        assert_eq!(app.focused_panel, FocusedPanel::Details);
        app.on_key(KeyCode::Tab);
        assert_eq!(app.focused_panel, FocusedPanel::Podcasts);
        app.on_key(KeyCode::BackTab);
        assert_eq!(app.focused_panel, FocusedPanel::Details);
    }

    #[test]
    fn test_quit() {
        let (mut app, _rx) = app_with_data();
        app.on_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
