//! 阅读页：正文分段显示与上一章/下一章。

use super::*;

use crate::view::ReaderView;
use crate::view::render::NavButton;

pub(super) fn handle_key_reader(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left => dispatch(app, Action::Prev),
        KeyCode::Right | KeyCode::Char('n') => dispatch(app, Action::Next),
        KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
            dispatch(app, Action::BackToDetail)
        }
        KeyCode::Up | KeyCode::Char('k') => scroll(app, -1),
        KeyCode::Down | KeyCode::Char('j') => scroll(app, 1),
        KeyCode::PageUp => scroll(app, -10),
        KeyCode::PageDown | KeyCode::Char(' ') => scroll(app, 10),
        _ => {}
    }
}

pub(super) fn scroll(app: &mut App, delta: i32) {
    let next = (i32::from(app.reader_scroll) + delta).clamp(0, i32::from(app.reader_scroll_max));
    app.reader_scroll = u16::try_from(next).unwrap_or(0);
}

pub(super) fn draw_reader(frame: &mut ratatui::Frame, area: Rect, app: &mut App, view: &ReaderView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let top = Line::from(vec![
        Span::styled("← [b] Back to Menu", Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(
            format!("READING: {}", view.novel_title),
            Style::default().fg(ACCENT),
        ),
    ]);
    frame.render_widget(Paragraph::new(top), rows[0]);

    let reads = app.nav.screen().counters.display(&view.reads);
    let total = app
        .nav
        .state()
        .current_novel()
        .map(|n| n.chapters.len())
        .unwrap_or(0);
    let position = app.nav.state().current_chapter().unwrap_or(view.index) + 1;
    let heading = vec![
        Line::from(Span::styled(
            view.chapter_title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Episode {position}/{total}  ·  👁 {reads} Reads"),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(heading).alignment(Alignment::Center), rows[1]);

    let body = view.paragraphs.join("\n\n");
    let body_area = rows[2];
    let text_width = body_area.width.saturating_sub(2);
    let text_height = body_area.height.saturating_sub(2);
    let lines = wrapped_line_count(&body, text_width);
    app.reader_scroll_max = u16::try_from(lines.saturating_sub(usize::from(text_height)))
        .unwrap_or(u16::MAX);
    app.reader_scroll = app.reader_scroll.min(app.reader_scroll_max);

    frame.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((app.reader_scroll, 0))
            .block(Block::default().borders(Borders::TOP | Borders::BOTTOM)),
        body_area,
    );

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[3]);
    frame.render_widget(nav_button(&view.prev, "←", false), buttons[0]);
    frame.render_widget(nav_button(&view.next, "→", true), buttons[1]);
}

fn nav_button<'a>(button: &'a NavButton, key: &'a str, primary: bool) -> Paragraph<'a> {
    let style = match (button.enabled(), primary) {
        (false, _) => Style::default().fg(Color::DarkGray),
        (true, true) => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::White),
    };
    Paragraph::new(Line::from(Span::styled(
        format!("[{key}] {}", button.label),
        style,
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(button.caption))
}
