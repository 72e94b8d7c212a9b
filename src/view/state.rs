//! 导航状态（当前视图、选中小说与章节、排序方式）。

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::NovelDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Detail,
    Reader,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Popular,
    Latest,
}

impl SortBy {
    pub const ALL: [SortBy; 2] = [SortBy::Popular, SortBy::Latest];

    pub fn label(self) -> &'static str {
        match self {
            Self::Popular => "Popular",
            Self::Latest => "Latest",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub enum Transition {
    GoHome,
    SetSort(SortBy),
    EnterDetail(Arc<NovelDetail>),
    EnterReader(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("no novel selected")]
    NoNovel,
    #[error("chapter index {index} out of range (0..{len})")]
    ChapterOutOfRange { index: usize, len: usize },
}

/// 全局唯一的导航状态，只能通过 [`ViewState::apply`] 修改。
#[derive(Debug, Clone)]
pub struct ViewState {
    view: View,
    current_novel: Option<Arc<NovelDetail>>,
    current_chapter: Option<usize>,
    sort_by: SortBy,
}

impl ViewState {
    pub fn new(sort_by: SortBy) -> Self {
        Self {
            view: View::Home,
            current_novel: None,
            current_chapter: None,
            sort_by,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn current_novel(&self) -> Option<&Arc<NovelDetail>> {
        self.current_novel.as_ref()
    }

    pub fn current_chapter(&self) -> Option<usize> {
        self.current_chapter
    }

    pub fn sort_by(&self) -> SortBy {
        self.sort_by
    }

    /// 校验失败时状态保持不变。
    pub fn apply(&mut self, transition: Transition) -> Result<(), NavError> {
        match transition {
            Transition::GoHome => {
                self.view = View::Home;
                self.current_novel = None;
                self.current_chapter = None;
            }
            Transition::SetSort(sort) => {
                self.sort_by = sort;
            }
            Transition::EnterDetail(novel) => {
                self.view = View::Detail;
                self.current_novel = Some(novel);
                self.current_chapter = None;
            }
            Transition::EnterReader(index) => {
                let novel = self.current_novel.as_ref().ok_or(NavError::NoNovel)?;
                let len = novel.chapters.len();
                if index >= len {
                    return Err(NavError::ChapterOutOfRange { index, len });
                }
                self.view = View::Reader;
                self.current_chapter = Some(index);
            }
        }
        Ok(())
    }
}
