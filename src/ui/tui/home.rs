//! 首页：小说卡片列表与排序切换。

use super::*;

use ratatui::widgets::{List, ListItem};

use crate::view::HomeView;

pub(super) fn handle_key_home(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('1') | KeyCode::Char('p') => dispatch(app, Action::Filter(SortBy::Popular)),
        KeyCode::Char('2') | KeyCode::Char('l') => dispatch(app, Action::Filter(SortBy::Latest)),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter | KeyCode::Right => {
            if let Some(id) = selected_novel(app) {
                dispatch(app, Action::OpenNovel(id));
            }
        }
        _ => {}
    }
}

fn selected_novel(app: &App) -> Option<String> {
    let idx = app.list_state.selected()?;
    match &app.nav.screen().page {
        Page::Home(home) => home.cards.get(idx).map(|c| c.id.clone()),
        _ => None,
    }
}

pub(super) fn draw_home(frame: &mut ratatui::Frame, area: Rect, app: &mut App, view: &HomeView) {
    let counters = &app.nav.screen().counters;
    let inner_width = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = view
        .cards
        .iter()
        .map(|card| {
            let mut title = vec![Span::styled(
                truncate(&card.title, inner_width.saturating_sub(12)),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )];
            if card.completed {
                title.push(Span::raw(" "));
                title.push(Span::styled(
                    " COMPLETED ",
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
            }

            let meta = Line::from(vec![
                Span::styled(
                    format!("✎ {}", card.author),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("   "),
                Span::styled(
                    format!("👁 {}", counters.display(&card.counter)),
                    Style::default().fg(ACCENT),
                ),
            ]);
            let mut footer = vec![Span::styled(
                format!("{} Episodes", card.episodes),
                Style::default().fg(Color::DarkGray),
            )];
            if !card.cover.is_empty() {
                footer.push(Span::raw("   "));
                footer.push(Span::styled(
                    truncate(&format!("cover: {}", card.cover), inner_width.saturating_sub(20)),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            ListItem::new(vec![Line::from(title), meta, Line::from(footer), Line::from("")])
        })
        .collect();

    let title = format!(" {} novels · {} ", view.cards.len(), view.sort_by);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Rgb(30, 40, 48)))
        .highlight_symbol("▌ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}
