use std::rc::Rc;
// src/terminal_ui
use crate::app::{App, FocusedPanel};
use crate::format::format_duration;
use crate::theme::Theme;
use crate::view::entry_list::{Entry, ListStatus};
use crate::view::selection::Selection;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

pub struct LayoutChunks {
    pub player_chunk: Rect,
    pub content_chunk: Rect,
    pub status_chunk: Rect,
    pub hint_chunk: Rect,
    pub podcasts_chunk: Rect,
    pub episodes_chunk: Rect,
    pub details_chunk: Rect,
}

pub fn compute_layout(frame_size: Rect) -> LayoutChunks {
    let main_chunks: Rc<[Rect]> = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_chunk: Rect = main_chunks[1];

    let content_columns: Rc<[Rect]> = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(content_chunk);

    LayoutChunks {
        player_chunk: main_chunks[0],
        content_chunk,
        status_chunk: main_chunks[2],
        hint_chunk: main_chunks[3],
        podcasts_chunk: content_columns[0],
        episodes_chunk: content_columns[1],
        details_chunk: content_columns[2],
    }
}

/// Sizes the details scroll state before drawing, outside the draw closure.
pub fn prepare_ui_layout(app: &mut App, frame_size: Rect) {
    let layout_chunks: LayoutChunks = compute_layout(frame_size);
    let inner_area: Rect = Block::default().borders(Borders::ALL).inner(layout_chunks.details_chunk);
    let header_lines = details_header(app).lines.len() as u16;
    app.details_state
        .set_dimensions(inner_area.width, inner_area.height.saturating_sub(header_lines));
}

struct Styles {
    default: Style,
    focused: Style,
    selected: Style,
    subtitle: Style,
    warning: Style,
}

impl Styles {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            default: Style::default().fg(Color::White),
            focused: Style::default().fg(theme.highlight()),
            selected: Style::default().bg(theme.selection()).add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::Gray),
            warning: Style::default().fg(Color::Yellow),
        }
    }
}

fn entry_item(entry: &Entry, is_selected: bool, styles: &Styles) -> ListItem<'static> {
    let mut title_spans = Vec::new();
    if let Some(kind) = entry.icon {
        title_spans.push(Span::raw(format!("{} ", kind.icon())));
    }
    title_spans.push(Span::raw(entry.title.clone()));
    if !entry.missing.is_empty() {
        title_spans.push(Span::styled(" !", styles.warning));
    }

    let mut lines = vec![Line::from(title_spans)];
    if !entry.subtitle.is_empty() {
        lines.push(Line::from(Span::styled(format!("  {}", entry.subtitle), styles.subtitle)));
    }

    let style = if is_selected { styles.selected } else { styles.default };
    ListItem::new(Text::from(lines)).style(style)
}

fn placeholder(status: &ListStatus, empty_text: &str) -> String {
    match status {
        ListStatus::Idle => empty_text.to_string(),
        ListStatus::Loading => "Loading...".to_string(),
        ListStatus::Loaded(_) => "Nothing here.".to_string(),
        ListStatus::Failed(message) => format!("Could not load: {}", message),
    }
}

fn list_widget<'a>(
    title: String,
    entries: &'a [Entry],
    status: &ListStatus,
    is_selected: impl Fn(&Entry) -> bool,
    is_focused: bool,
    empty_text: &str,
    styles: &Styles,
) -> List<'a> {
    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(placeholder(status, empty_text)).style(styles.subtitle)]
    } else {
        entries.iter().map(|entry| entry_item(entry, is_selected(entry), styles)).collect()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_focused { styles.focused } else { styles.default });
    List::new(items)
        .block(block)
        .highlight_symbol(if is_focused { ">> " } else { "   " })
}

fn details_header(app: &App) -> Text<'static> {
    let Some(detail) = app.controller.detail() else {
        return Text::default();
    };
    let mut lines = vec![Line::from(Span::styled(
        detail.title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(release) = detail.release_line() {
        lines.push(Line::from(release.to_string()));
    }
    lines.push(Line::from(format!("Size: {}", detail.size())));
    if let Some(link) = detail.link() {
        lines.push(Line::from(format!("Link: {}", link)));
    }
    match detail.player() {
        Some(player) => {
            lines.push(Line::from(format!(
                "Player: {} {} [{}]",
                player.kind().icon(),
                player.position_line(),
                player.mime_type()
            )));
            if let (false, Some(paused_at)) = (player.is_playing(), player.last_position()) {
                lines.push(Line::from(format!("Paused at {}", format_duration(Some(paused_at)))));
            }
        }
        None => lines.push(Line::from("Player: not playable")),
    }
    if !detail.missing().is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Missing: {}", detail.missing().join(", ")),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(""));
    Text::from(lines)
}

/// Download colour while a request is in flight, muted otherwise.
fn status_style(app: &App) -> Style {
    let loading = [app.controller.podcasts().status(), app.controller.episodes().status()]
        .iter()
        .any(|status| matches!(status, ListStatus::Loading));
    let color = if loading { app.theme.download() } else { app.theme.muted() };
    Style::default().fg(color)
}

fn status_text(app: &App) -> String {
    let describe = |name: &str, status: &ListStatus| match status {
        ListStatus::Idle => None,
        ListStatus::Loading => Some(format!("{}: loading", name)),
        ListStatus::Loaded(at) => Some(format!("{}: updated {}", name, at.format("%H:%M:%S"))),
        ListStatus::Failed(message) => Some(format!("{}: {}", name, message)),
    };
    [
        describe("Podcasts", app.controller.podcasts().status()),
        describe("Episodes", app.controller.episodes().status()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<String>>()
    .join(" | ")
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let layout_chunks: LayoutChunks = compute_layout(f.size());
    let styles = Styles::from_theme(&app.theme);
    let selection: Selection = *app.controller.selection();

    // =================================== Player Panel ============================================
    let (player_panel_title, player_panel_text): (String, String) = match app.controller.detail() {
        Some(detail) => match detail.player() {
            Some(player) if player.is_playing() => (
                "Now Playing".to_string(),
                format!("▶ {}  {}", detail.title(), player.position_line()),
            ),
            Some(player) => {
                ("Paused".to_string(), format!("⏸ {}  {}", detail.title(), player.position_line()))
            }
            None => ("Not Playing".to_string(), detail.title().to_string()),
        },
        None => ("Not Playing".to_string(), " ".to_string()),
    };
    let player_widget: Paragraph = Paragraph::new(player_panel_text).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(player_panel_title)
            .borders(Borders::ALL)
            .style(Style::default().fg(app.theme.playback())),
    );
    f.render_widget(player_widget, layout_chunks.player_chunk);

    // ================================== Podcasts Panel (Left) ====================================
    let podcasts_focused = app.focused_panel == FocusedPanel::Podcasts;
    let podcasts_list = list_widget(
        "Podcasts".to_string(),
        app.controller.podcasts().entries(),
        app.controller.podcasts().status(),
        |entry| selection.is_podcast_selected(entry.id),
        podcasts_focused,
        "Press r to load podcasts",
        &styles,
    );
    let mut podcasts_state = ListState::default();
    if !app.controller.podcasts().is_empty() {
        podcasts_state.select(Some(app.podcast_cursor));
    }
    f.render_stateful_widget(podcasts_list, layout_chunks.podcasts_chunk, &mut podcasts_state);

    // ============================== Episodes Panel (Middle) ======================================
    let episodes_focused = app.focused_panel == FocusedPanel::Episodes;
    let episodes_title = match app.controller.episode_header() {
        Some(header) => format!("Episodes of '{}'", header),
        None => "Episodes".to_string(),
    };
    let episodes_list = list_widget(
        episodes_title,
        app.controller.episodes().entries(),
        app.controller.episodes().status(),
        |entry| selection.is_episode_selected(entry.id),
        episodes_focused,
        "Select a podcast to see episodes",
        &styles,
    );
    let mut episodes_state = ListState::default();
    if !app.controller.episodes().is_empty() {
        episodes_state.select(Some(app.episode_cursor));
    }
    f.render_stateful_widget(episodes_list, layout_chunks.episodes_chunk, &mut episodes_state);

    // ============================== Details Panel (Right) ========================================
    let details_focused = app.focused_panel == FocusedPanel::Details;
    let details_block: Block = Block::default()
        .title("Details")
        .borders(Borders::ALL)
        .border_style(if details_focused { styles.focused } else { styles.default });
    let inner = details_block.inner(layout_chunks.details_chunk);
    f.render_widget(details_block, layout_chunks.details_chunk);

    let header = details_header(app);
    let header_height = (header.lines.len() as u16).min(inner.height);
    let details_chunks: Rc<[Rect]> = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), details_chunks[0]);
    let description: Paragraph = Paragraph::new(app.details_state.content.clone())
        .wrap(Wrap { trim: true })
        .style(styles.default)
        .scroll((app.details_state.scroll_offset_vertical, 0));
    f.render_widget(description, details_chunks[1]);

    // ================================== Status line ==============================================
    let status_widget = Paragraph::new(status_text(app)).style(status_style(app));
    f.render_widget(status_widget, layout_chunks.status_chunk);

    // =============================== Hint Bar Panel (Bottom) =====================================
    let hint_text: &str = "[←/→/Tab] Panel | [↑/↓] Move | [Enter] Select | [Space] Play/Pause | [Esc] Close | [R] Reload | [Q] Quit";
    let hint_widget: Paragraph = Paragraph::new(hint_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint_widget, layout_chunks.hint_chunk);
}
