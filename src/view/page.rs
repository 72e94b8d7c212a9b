use super::render::{DetailView, HomeView, ReaderView};
use crate::counter::{CounterSlots, CounterTarget};

pub const FATAL_LOAD_MESSAGE: &str = "Error loading database. Please try again.";

/// 当前显示的页面内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Booting,
    Fatal(String),
    Home(HomeView),
    Loading { novel_id: String },
    Detail(DetailView),
    Reader(ReaderView),
}

impl Page {
    pub fn counter_targets(&self) -> Vec<CounterTarget> {
        match self {
            Page::Home(home) => home.cards.iter().map(|c| c.counter.clone()).collect(),
            Page::Detail(detail) => vec![detail.total_reads.clone()],
            Page::Reader(reader) => vec![reader.reads.clone()],
            Page::Booting | Page::Fatal(_) | Page::Loading { .. } => Vec::new(),
        }
    }
}

/// 页面与其计数位。每次渲染整体替换，旧页面的计数位随之失效。
#[derive(Debug, Clone)]
pub struct Screen {
    pub page: Page,
    pub counters: CounterSlots,
}

impl Screen {
    pub fn new(page: Page) -> Self {
        let counters = CounterSlots::with_targets(page.counter_targets());
        Self { page, counters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::slots::SlotState;
    use crate::view::render::{HomeView, NovelCard};
    use crate::view::state::SortBy;

    #[test]
    fn new_screen_has_pending_slot_per_card() {
        let card = |id: &str| NovelCard {
            id: id.into(),
            title: id.into(),
            author: String::new(),
            cover: String::new(),
            completed: false,
            episodes: 0,
            counter: CounterTarget::Card {
                novel_id: id.into(),
            },
        };
        let screen = Screen::new(Page::Home(HomeView {
            sort_by: SortBy::Popular,
            cards: vec![card("a"), card("b")],
        }));
        for id in ["a", "b"] {
            let target = CounterTarget::Card {
                novel_id: id.into(),
            };
            assert_eq!(screen.counters.get(&target), Some(SlotState::Pending));
        }
        assert!(Screen::new(Page::Booting).counters.get(&card("a").counter).is_none());
    }
}
