//! 终端界面：首页网格、详情页、阅读页。
//!
//! 所有页面数据来自 [`Navigator`]；后台任务结果经通道回到本线程后再写入。

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListState, Paragraph, Wrap};
use tracing::info;

mod detail;
mod home;
mod reader;

use crate::base_system::logging::take_broadcast_rx;
use crate::controller::{Action, JobDone, Navigator, Services, jobs};
use crate::view::{Page, SortBy, View};

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const LOG_HEIGHT: u16 = 6;
const MAX_LOG_LINES: usize = 200;
pub(super) const ACCENT: Color = Color::Cyan;

pub(super) struct App {
    nav: Navigator,
    services: Services,
    worker_tx: Sender<JobDone>,
    worker_rx: Receiver<JobDone>,
    library_label: String,
    should_quit: bool,

    // 首页卡片 / 详情章节列表共用
    list_state: ListState,

    // 阅读页滚动
    reader_scroll: u16,
    reader_scroll_max: u16,

    spinner_idx: usize,
    spinner_last: Instant,

    logs: Vec<String>,
    log_rx: Option<crossbeam_channel::Receiver<String>>,
}

impl App {
    fn new(nav: Navigator, services: Services, library_label: String) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        Self {
            nav,
            services,
            worker_tx,
            worker_rx,
            library_label,
            should_quit: false,
            list_state: ListState::default(),
            reader_scroll: 0,
            reader_scroll_max: 0,
            spinner_idx: 0,
            spinner_last: Instant::now(),
            logs: Vec::new(),
            log_rx: take_broadcast_rx(),
        }
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        let trimmed = msg.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return;
        }
        self.logs.push(trimmed.to_string());
        if self.logs.len() > MAX_LOG_LINES {
            let overflow = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..overflow);
        }
    }

    fn list_len(&self) -> usize {
        match &self.nav.screen().page {
            Page::Home(home) => home.cards.len(),
            Page::Detail(detail) => detail.chapters.len(),
            _ => 0,
        }
    }

    pub(super) fn select_next(&mut self) {
        let len = self.list_len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let next = match self.list_state.selected() {
            Some(idx) if idx + 1 < len => idx + 1,
            _ => 0,
        };
        self.list_state.select(Some(next));
    }

    pub(super) fn select_prev(&mut self) {
        let len = self.list_len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let prev = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        };
        self.list_state.select(Some(prev));
    }

    pub(super) fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()]
    }

    /// 页面切换后重置列表选中项与阅读滚动位置。
    fn reset_page_ui(&mut self) {
        let len = self.list_len();
        self.list_state = ListState::default();
        self.list_state.select(if len > 0 { Some(0) } else { None });
        self.reader_scroll = 0;
        self.reader_scroll_max = 0;
    }
}

pub fn run(nav: Navigator, services: Services, library_label: String) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("init terminal")?;

    let mut app = App::new(nav, services, library_label);
    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    info!(target: "ui", library = %app.library_label, "启动");
    let jobs = app.nav.initialize();
    launch(app, jobs);

    loop {
        tick_spinner(app);
        poll_worker(app);
        drain_log_channel(app);

        terminal.draw(|f| draw_ui(f, app))?;

        if !handle_event(app)? {
            break;
        }
    }
    Ok(())
}

fn launch(app: &App, jobs: Vec<jobs::Job>) {
    for job in jobs {
        jobs::spawn(job, &app.services, &app.worker_tx);
    }
}

pub(super) fn dispatch(app: &mut App, action: Action) {
    let before = app.nav.generation();
    let jobs = app.nav.dispatch(action);
    if app.nav.generation() != before {
        app.reset_page_ui();
    }
    launch(app, jobs);
}

fn poll_worker(app: &mut App) {
    while let Ok(done) = app.worker_rx.try_recv() {
        let before = app.nav.generation();
        let jobs = app.nav.complete(done);
        if app.nav.generation() != before {
            app.reset_page_ui();
        }
        launch(app, jobs);
    }
}

fn drain_log_channel(app: &mut App) {
    if let Some(rx) = app.log_rx.clone() {
        for line in rx.try_iter() {
            app.push_log(line);
        }
    }
}

fn tick_spinner(app: &mut App) {
    if app.spinner_last.elapsed() < Duration::from_millis(140) {
        return;
    }
    app.spinner_idx = (app.spinner_idx + 1) % SPINNER_FRAMES.len();
    app.spinner_last = Instant::now();
}

fn handle_event(app: &mut App) -> Result<bool> {
    if !event::poll(Duration::from_millis(120)).context("poll event")? {
        return Ok(true);
    }

    match event::read().context("read event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(me) => match me.kind {
            MouseEventKind::ScrollUp => scroll(app, true),
            MouseEventKind::ScrollDown => scroll(app, false),
            _ => {}
        },
        _ => {}
    }
    Ok(!app.should_quit)
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('h') | KeyCode::Home => {
            dispatch(app, Action::Home);
            return;
        }
        _ => {}
    }

    match page_kind(app) {
        PageKind::Home => home::handle_key_home(app, key),
        PageKind::Detail => detail::handle_key_detail(app, key),
        PageKind::Reader => reader::handle_key_reader(app, key),
        PageKind::Other => {
            if key.code == KeyCode::Esc {
                app.should_quit = true;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Home,
    Detail,
    Reader,
    Other,
}

fn page_kind(app: &App) -> PageKind {
    match &app.nav.screen().page {
        Page::Home(_) => PageKind::Home,
        Page::Detail(_) => PageKind::Detail,
        Page::Reader(_) => PageKind::Reader,
        Page::Booting | Page::Fatal(_) | Page::Loading { .. } => PageKind::Other,
    }
}

fn scroll(app: &mut App, up: bool) {
    match page_kind(app) {
        PageKind::Reader => reader::scroll(app, if up { -3 } else { 3 }),
        PageKind::Home | PageKind::Detail => {
            if up {
                app.select_prev();
            } else {
                app.select_next();
            }
        }
        PageKind::Other => {}
    }
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(LOG_HEIGHT),
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);

    match app.nav.screen().page.clone() {
        Page::Booting => draw_waiting(frame, chunks[1], app, "Loading library"),
        Page::Loading { novel_id } => {
            draw_waiting(frame, chunks[1], app, &format!("Loading {novel_id}"))
        }
        Page::Fatal(message) => draw_fatal(frame, chunks[1], &message),
        Page::Home(view) => home::draw_home(frame, chunks[1], app, &view),
        Page::Detail(view) => detail::draw_detail(frame, chunks[1], app, &view),
        Page::Reader(view) => reader::draw_reader(frame, chunks[1], app, &view),
    }

    draw_status(frame, chunks[2], app);
    render_log_box(frame, chunks[3], app);
}

fn draw_header(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            " TOPAZ NOVELS ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[h] Home", Style::default().fg(Color::White)),
    ];

    // 过滤按钮只在首页显示
    if app.nav.state().view() == View::Home && app.nav.catalog().is_loaded() {
        spans.push(Span::raw("    "));
        for (idx, sort) in SortBy::ALL.into_iter().enumerate() {
            let active = app.nav.state().sort_by() == sort;
            let style = if active {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" [{}] {} ", idx + 1, sort.label()), style));
            spans.push(Span::raw(" "));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.library_label.as_str()),
    );
    frame.render_widget(header, area);
}

fn draw_waiting(frame: &mut ratatui::Frame, area: Rect, app: &App, text: &str) {
    let para = Paragraph::new(Line::from(Span::styled(
        format!("{} {text}…", app.spinner()),
        Style::default().fg(ACCENT),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(para, centered_band(area, 3));
}

fn draw_fatal(frame: &mut ratatui::Frame, area: Rect, message: &str) {
    let para = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::LightRed),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(para, centered_band(area, 3));
}

fn draw_status(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let hints = match &app.nav.screen().page {
        Page::Home(_) => "↑/↓ 选择  Enter 打开  1/2 排序  q 退出",
        Page::Detail(_) => "↑/↓ 选择章节  Enter 阅读  h 首页  q 退出",
        Page::Reader(_) => "←/→ 上/下一章  ↑/↓ PgUp/PgDn 滚动  b 返回目录  h 首页  q 退出",
        _ => "h 首页  q 退出",
    };
    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
    if app.nav.screen().counters.has_pending() {
        spans.push(Span::styled(
            format!("   {} 阅读数更新中", app.spinner()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_log_box(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2).max(1) as usize;
    let lines: Vec<Line> = if app.logs.is_empty() {
        vec![Line::from("日志: 暂无")]
    } else {
        app.logs
            .iter()
            .rev()
            .take(visible)
            .rev()
            .map(|m| style_log_line(m))
            .collect()
    };
    let log = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("日志"));
    frame.render_widget(log, area);
}

fn style_log_line(line: &str) -> Line<'static> {
    let color = if line.contains("ERROR") {
        Color::LightRed
    } else if line.contains("WARN") {
        Color::Yellow
    } else if line.contains("DEBUG") {
        Color::DarkGray
    } else {
        Color::Gray
    };
    Line::from(Span::styled(line.to_string(), Style::default().fg(color)))
}

fn centered_band(area: Rect, height: u16) -> Rect {
    let h = height.min(area.height);
    Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: area.width,
        height: h,
    }
}

pub(super) fn wrapped_line_count(text: &str, width: u16) -> usize {
    let w = width.max(1) as usize;
    text.lines()
        .map(|line| textwrap::wrap(line, w).len().max(1))
        .sum::<usize>()
        .max(1)
}

pub(super) fn truncate(text: &str, limit: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in text.chars().enumerate() {
        if idx >= limit {
            out.push('…');
            break;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::models::ChapterSummary;
    use crate::catalog::{CatalogError, LibrarySource, NovelDetail, NovelSummary};
    use crate::counter::DisabledCounter;

    struct OneNovel;

    impl LibrarySource for OneNovel {
        fn fetch_manifest(&self) -> Result<Vec<NovelSummary>, CatalogError> {
            Ok(vec![NovelSummary {
                id: "n".into(),
                title: "N".into(),
                author: "someone".into(),
                cover: "covers/n.jpg".into(),
                view_count: 1,
                last_update: "2024-01-01".into(),
                is_ended: false,
                total_chapters: 2,
            }])
        }

        fn fetch_detail(&self, novel_id: &str) -> Result<NovelDetail, CatalogError> {
            Ok(NovelDetail {
                id: novel_id.into(),
                title: "N".into(),
                author: "someone".into(),
                cover: String::new(),
                synopsis: String::new(),
                chapters: (1..=2)
                    .map(|n| ChapterSummary {
                        chapter_number: n,
                        title: format!("Chapter {n}"),
                        content: "text\n".repeat(80),
                        views: None,
                    })
                    .collect(),
            })
        }
    }

    fn settle(app: &mut App, mut pending: Vec<jobs::Job>) {
        while let Some(job) = pending.pop() {
            let done = jobs::execute(&job, &app.services);
            pending.extend(app.nav.complete(done));
        }
    }

    fn reading_app() -> App {
        let services = Services {
            library: Arc::new(OneNovel),
            counter: Arc::new(DisabledCounter),
        };
        let mut app = App::new(Navigator::new(SortBy::Popular), services, "test".into());
        let boot = app.nav.initialize();
        settle(&mut app, boot);
        let open = app.nav.dispatch(Action::OpenNovel("n".into()));
        settle(&mut app, open);
        let read = app.nav.dispatch(Action::OpenChapter(0));
        settle(&mut app, read);
        app
    }

    #[test]
    fn inert_previous_keeps_reader_scroll() {
        let mut app = reading_app();
        app.reader_scroll = 40;

        dispatch(&mut app, Action::Prev);
        assert_eq!(app.reader_scroll, 40);
        assert!(matches!(&app.nav.screen().page, Page::Reader(r) if r.index == 0));

        dispatch(&mut app, Action::Next);
        assert_eq!(app.reader_scroll, 0);
        assert!(matches!(&app.nav.screen().page, Page::Reader(r) if r.index == 1));
    }

    #[test]
    fn wrapped_count_handles_long_and_empty_lines() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("short\n\nline", 20), 3);
        assert!(wrapped_line_count("word ".repeat(20).trim(), 10) >= 10);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
