//! 三种视图的渲染：从书库数据与导航状态生成展示用的视图模型。
//!
//! 这里只产生数据，不涉及终端绘制，便于单独测试。

use std::cmp::Ordering;

use time::OffsetDateTime;

use super::state::SortBy;
use crate::catalog::{NovelDetail, NovelSummary};
use crate::controller::Action;
use crate::counter::CounterTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover: String,
    pub completed: bool,
    pub episodes: u32,
    pub counter: CounterTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub sort_by: SortBy,
    pub cards: Vec<NovelCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRow {
    /// 在详情 JSON 章节数组中的位置。
    pub index: usize,
    pub number: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub author: String,
    pub cover: String,
    pub synopsis: String,
    pub total_reads: CounterTarget,
    pub chapters: Vec<ChapterRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavButton {
    pub caption: &'static str,
    pub label: &'static str,
    /// `None` 表示按钮不可用。
    pub action: Option<Action>,
}

impl NavButton {
    pub fn enabled(&self) -> bool {
        self.action.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderView {
    pub novel_title: String,
    pub index: usize,
    pub chapter_title: String,
    pub paragraphs: Vec<String>,
    pub reads: CounterTarget,
    /// 自增失败时展示的静态阅读数。
    pub fallback_reads: i64,
    pub back: Action,
    pub prev: NavButton,
    pub next: NavButton,
}

pub fn sort_novels(novels: &[NovelSummary], sort_by: SortBy) -> Vec<&NovelSummary> {
    let mut out: Vec<&NovelSummary> = novels.iter().collect();
    match sort_by {
        // Vec::sort_by 为稳定排序，同值保持清单原顺序
        SortBy::Popular => out.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        SortBy::Latest => {
            let mut keyed: Vec<(Option<OffsetDateTime>, &NovelSummary)> =
                out.into_iter().map(|n| (n.updated_at(), n)).collect();
            keyed.sort_by(|(a, _), (b, _)| newest_first(*a, *b));
            out = keyed.into_iter().map(|(_, n)| n).collect();
        }
    }
    out
}

fn newest_first(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn render_home(novels: &[NovelSummary], sort_by: SortBy) -> HomeView {
    let cards = sort_novels(novels, sort_by)
        .into_iter()
        .map(|n| NovelCard {
            id: n.id.clone(),
            title: n.title.clone(),
            author: n.author.clone(),
            cover: n.cover.clone(),
            completed: n.is_ended,
            episodes: n.total_chapters,
            counter: CounterTarget::Card {
                novel_id: n.id.clone(),
            },
        })
        .collect();
    HomeView { sort_by, cards }
}

pub fn render_detail(novel: &NovelDetail) -> DetailView {
    DetailView {
        title: novel.title.clone(),
        author: novel.author.clone(),
        cover: novel.cover.clone(),
        synopsis: novel.synopsis.clone(),
        total_reads: CounterTarget::NovelTotal {
            novel_id: novel.id.clone(),
        },
        chapters: novel
            .chapters
            .iter()
            .enumerate()
            .map(|(index, c)| ChapterRow {
                index,
                number: c.chapter_number,
                title: c.title.clone(),
            })
            .collect(),
    }
}

/// 调用方保证 `index` 在范围内；越界时返回 `None`。
pub fn render_reader(novel: &NovelDetail, index: usize) -> Option<ReaderView> {
    let chapter = novel.chapter(index)?;
    let last = novel.last_index()?;

    let prev = NavButton {
        caption: "PREVIOUS",
        label: "Previous Episode",
        action: index.checked_sub(1).map(Action::OpenChapter),
    };
    let next = if index < last {
        NavButton {
            caption: "NEXT",
            label: "Next Episode",
            action: Some(Action::OpenChapter(index + 1)),
        }
    } else {
        NavButton {
            caption: "NEXT",
            label: "Finish & Return",
            action: Some(Action::OpenNovel(novel.id.clone())),
        }
    };

    Some(ReaderView {
        novel_title: novel.title.clone(),
        index,
        chapter_title: chapter.title.clone(),
        paragraphs: paragraphs(&chapter.content),
        reads: CounterTarget::ChapterReads {
            novel_id: novel.id.clone(),
            chapter_number: chapter.chapter_number,
        },
        fallback_reads: chapter.views.unwrap_or(0),
        back: Action::OpenNovel(novel.id.clone()),
        prev,
        next,
    })
}

/// 按换行切分正文，丢弃空白行。
pub fn paragraphs(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::ChapterSummary;

    fn summary(id: &str, views: u64, updated: &str) -> NovelSummary {
        NovelSummary {
            id: id.into(),
            title: id.to_uppercase(),
            author: "someone".into(),
            cover: format!("covers/{id}.jpg"),
            view_count: views,
            last_update: updated.into(),
            is_ended: false,
            total_chapters: 3,
        }
    }

    fn detail(numbers: &[u32]) -> NovelDetail {
        NovelDetail {
            id: "nv".into(),
            title: "Novel".into(),
            author: "someone".into(),
            cover: String::new(),
            synopsis: "About things.".into(),
            chapters: numbers
                .iter()
                .map(|&n| ChapterSummary {
                    chapter_number: n,
                    title: format!("Chapter {n}"),
                    content: format!("Body {n}\n\nMore {n}"),
                    views: Some(i64::from(n) * 10),
                })
                .collect(),
        }
    }

    fn ids(view: &HomeView) -> Vec<&str> {
        view.cards.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn popular_is_descending_and_stable() {
        let novels = vec![
            summary("a", 5, ""),
            summary("b", 9, ""),
            summary("c", 5, ""),
            summary("d", 9, ""),
            summary("e", 1, ""),
        ];
        let view = render_home(&novels, SortBy::Popular);
        assert_eq!(ids(&view), ["b", "d", "a", "c", "e"]);
        let counts: Vec<u64> = sort_novels(&novels, SortBy::Popular)
            .iter()
            .map(|n| n.view_count)
            .collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn latest_is_newest_first_with_unparseable_last() {
        let novels = vec![
            summary("old", 0, "2023-03-01"),
            summary("bad", 0, "someday"),
            summary("new", 0, "2024-06-01"),
            summary("tie1", 0, "2024-01-01"),
            summary("tie2", 0, "2024-01-01"),
        ];
        let view = render_home(&novels, SortBy::Latest);
        assert_eq!(ids(&view), ["new", "tie1", "tie2", "old", "bad"]);
    }

    #[test]
    fn sort_switch_reorders_two_novels() {
        let novels = vec![summary("jan", 50, "2024-01-01"), summary("jun", 10, "2024-06-01")];
        assert_eq!(ids(&render_home(&novels, SortBy::Popular)), ["jan", "jun"]);
        assert_eq!(ids(&render_home(&novels, SortBy::Latest)), ["jun", "jan"]);
    }

    #[test]
    fn cards_carry_badge_and_counter() {
        let mut done = summary("z", 1, "");
        done.is_ended = true;
        let view = render_home(&[done], SortBy::Popular);
        let card = &view.cards[0];
        assert!(card.completed);
        assert_eq!(card.cover, "covers/z.jpg");
        assert_eq!(card.episodes, 3);
        assert_eq!(
            card.counter,
            CounterTarget::Card {
                novel_id: "z".into()
            }
        );
    }

    #[test]
    fn detail_keeps_source_chapter_order() {
        let view = render_detail(&detail(&[3, 1, 2]));
        let numbers: Vec<u32> = view.chapters.iter().map(|c| c.number).collect();
        let indices: Vec<usize> = view.chapters.iter().map(|c| c.index).collect();
        assert_eq!(numbers, [3, 1, 2]);
        assert_eq!(indices, [0, 1, 2]);
        assert_eq!(view.synopsis, "About things.");
    }

    #[test]
    fn paragraphs_drop_blank_lines() {
        assert_eq!(paragraphs("Line A\n\nLine B\n"), ["Line A", "Line B"]);
        assert_eq!(paragraphs("  \n\t\nonly\r\n"), ["only"]);
        assert!(paragraphs("").is_empty());
    }

    #[test]
    fn first_chapter_has_inert_previous() {
        let novel = detail(&[1, 2, 3]);
        let view = render_reader(&novel, 0).expect("chapter exists");
        assert!(!view.prev.enabled());
        assert_eq!(view.next.action, Some(Action::OpenChapter(1)));
        assert_eq!(view.next.label, "Next Episode");
    }

    #[test]
    fn last_chapter_finishes_back_to_detail() {
        let novel = detail(&[1, 2, 3]);
        let view = render_reader(&novel, 2).expect("chapter exists");
        assert_eq!(view.prev.action, Some(Action::OpenChapter(1)));
        assert_eq!(view.next.label, "Finish & Return");
        assert_eq!(view.next.action, Some(Action::OpenNovel("nv".into())));
    }

    #[test]
    fn reader_uses_chapter_number_for_counter() {
        let novel = detail(&[7, 9]);
        let view = render_reader(&novel, 1).expect("chapter exists");
        assert_eq!(
            view.reads,
            CounterTarget::ChapterReads {
                novel_id: "nv".into(),
                chapter_number: 9
            }
        );
        assert_eq!(view.fallback_reads, 90);
        assert_eq!(view.paragraphs, ["Body 9", "More 9"]);
        assert!(render_reader(&novel, 2).is_none());
    }

    #[test]
    fn single_chapter_is_both_first_and_last() {
        let novel = detail(&[1]);
        let view = render_reader(&novel, 0).expect("chapter exists");
        assert!(!view.prev.enabled());
        assert_eq!(view.next.label, "Finish & Return");
    }
}
