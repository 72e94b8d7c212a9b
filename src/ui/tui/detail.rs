//! 详情页：简介、总阅读数与章节列表。

use super::*;

use ratatui::widgets::{List, ListItem};

use crate::view::DetailView;

pub(super) fn handle_key_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter | KeyCode::Right => {
            if let Some(index) = selected_chapter(app) {
                dispatch(app, Action::OpenChapter(index));
            }
        }
        KeyCode::Esc | KeyCode::Backspace => dispatch(app, Action::Home),
        _ => {}
    }
}

fn selected_chapter(app: &App) -> Option<usize> {
    let idx = app.list_state.selected()?;
    match &app.nav.screen().page {
        Page::Detail(detail) => detail.chapters.get(idx).map(|c| c.index),
        _ => None,
    }
}

pub(super) fn draw_detail(frame: &mut ratatui::Frame, area: Rect, app: &mut App, view: &DetailView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(columns[1]);

    let reads = app.nav.screen().counters.display(&view.total_reads);
    let info = vec![
        Line::from(Span::styled(
            view.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("👤 {}", view.author),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            reads,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "TOTAL READS",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("cover: {}", view.cover),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(info)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        columns[0],
    );

    frame.render_widget(
        Paragraph::new(view.synopsis.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(" SYNOPSIS ", Style::default().fg(ACCENT))),
            ),
        right[0],
    );

    let items: Vec<ListItem> = view
        .chapters
        .iter()
        .map(|row| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("#{:<4}", row.number),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(row.title.clone(), Style::default().fg(Color::White)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" EPISODES ({}) ", view.chapters.len())),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(ACCENT))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, right[1], &mut app.list_state);
}
