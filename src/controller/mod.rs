//! 导航控制：响应用户操作、切换视图状态并安排后台任务。
//!
//! [`Navigator`] 是导航状态与当前页面的唯一写入者，只在 UI 线程上使用。

pub mod jobs;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogStore, NovelDetail};
use crate::counter::Applied;
use crate::view::{
    FATAL_LOAD_MESSAGE, Page, Screen, SortBy, Transition, View, ViewState, render_detail,
    render_home, render_reader,
};

pub use jobs::{Job, JobDone, Services};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Home,
    Filter(SortBy),
    OpenNovel(String),
    OpenChapter(usize),
    Prev,
    Next,
    BackToDetail,
}

pub struct Navigator {
    catalog: CatalogStore,
    state: ViewState,
    screen: Screen,
    /// 每次整体替换页面时加一。
    generation: u64,
    awaiting_detail: Option<String>,
}

impl Navigator {
    pub fn new(sort_by: SortBy) -> Self {
        Self {
            catalog: CatalogStore::new(),
            state: ViewState::new(sort_by),
            screen: Screen::new(Page::Booting),
            generation: 0,
            awaiting_detail: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// 页面替换计数；无效操作（如首章点“上一章”）不会改变它。
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// 启动：请求书库清单。成功后进入首页。
    pub fn initialize(&mut self) -> Vec<Job> {
        if self.catalog.is_loaded() {
            return self.show_home();
        }
        self.replace_screen(Page::Booting);
        vec![Job::LoadManifest]
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Job> {
        debug!(target: "nav", ?action, view = ?self.state.view(), "dispatch");
        match action {
            Action::Home => {
                if !self.catalog.is_loaded() {
                    return Vec::new();
                }
                self.transition(Transition::GoHome);
                self.show_home()
            }
            Action::Filter(sort) => {
                if !self.catalog.is_loaded() || self.state.view() != View::Home {
                    return Vec::new();
                }
                self.transition(Transition::SetSort(sort));
                self.show_home()
            }
            Action::OpenNovel(novel_id) => {
                info!(target: "nav", novel_id = %novel_id, "打开小说详情");
                self.awaiting_detail = Some(novel_id.clone());
                self.replace_screen(Page::Loading {
                    novel_id: novel_id.clone(),
                });
                vec![Job::LoadDetail { novel_id }]
            }
            Action::OpenChapter(index) => self.show_reader(index),
            Action::Prev | Action::Next | Action::BackToDetail => {
                let Page::Reader(reader) = &self.screen.page else {
                    return Vec::new();
                };
                let target = match action {
                    Action::Prev => reader.prev.action.clone(),
                    Action::Next => reader.next.action.clone(),
                    _ => Some(reader.back.clone()),
                };
                match target {
                    Some(next) => self.dispatch(next),
                    None => Vec::new(),
                }
            }
        }
    }

    /// 写入后台任务结果，返回由此产生的新任务。
    pub fn complete(&mut self, done: JobDone) -> Vec<Job> {
        match done {
            JobDone::Manifest(Ok(novels)) => {
                self.catalog.install(novels);
                if matches!(self.screen.page, Page::Booting) {
                    self.show_home()
                } else {
                    Vec::new()
                }
            }
            JobDone::Manifest(Err(err)) => {
                error!(target: "catalog", "书库清单加载失败: {err}");
                self.replace_screen(Page::Fatal(FATAL_LOAD_MESSAGE.to_string()));
                Vec::new()
            }
            JobDone::Detail { novel_id, result } => {
                let current = matches!(
                    &self.screen.page,
                    Page::Loading { novel_id: loading } if *loading == novel_id
                );
                if !current || self.awaiting_detail.as_deref() != Some(novel_id.as_str()) {
                    debug!(target: "nav", novel_id = %novel_id, "详情返回时页面已切换，忽略");
                    return Vec::new();
                }
                match result {
                    Ok(detail) => {
                        self.awaiting_detail = None;
                        self.show_detail(detail)
                    }
                    Err(err) => {
                        // 保持加载页，不提供错误视图
                        warn!(target: "catalog", novel_id = %novel_id, "小说详情加载失败: {err}");
                        Vec::new()
                    }
                }
            }
            JobDone::Count { target, outcome } => {
                match self.screen.counters.apply(&target, outcome) {
                    Applied::Gone => {
                        debug!(target: "counter", key = %target.key(), "计数位已不存在，丢弃结果")
                    }
                    Applied::Kept => {
                        debug!(target: "counter", key = %target.key(), "已有计数，忽略失败结果")
                    }
                    Applied::Written(_) => {}
                }
                Vec::new()
            }
        }
    }

    fn transition(&mut self, transition: Transition) -> bool {
        match self.state.apply(transition) {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "nav", "导航被拒绝: {err}");
                false
            }
        }
    }

    fn show_home(&mut self) -> Vec<Job> {
        self.awaiting_detail = None;
        let home = render_home(self.catalog.novels(), self.state.sort_by());
        self.replace_screen(Page::Home(home));
        self.read_jobs()
    }

    fn show_detail(&mut self, detail: NovelDetail) -> Vec<Job> {
        let view = render_detail(&detail);
        if !self.transition(Transition::EnterDetail(Arc::new(detail))) {
            return Vec::new();
        }
        self.replace_screen(Page::Detail(view));
        self.read_jobs()
    }

    fn show_reader(&mut self, index: usize) -> Vec<Job> {
        if !self.transition(Transition::EnterReader(index)) {
            return Vec::new();
        }
        let Some(novel) = self.state.current_novel().cloned() else {
            return Vec::new();
        };
        let Some(view) = render_reader(&novel, index) else {
            return Vec::new();
        };
        let job = Job::HitCount {
            target: view.reads.clone(),
            fallback: view.fallback_reads,
        };
        self.awaiting_detail = None;
        self.replace_screen(Page::Reader(view));
        vec![job]
    }

    fn replace_screen(&mut self, page: Page) {
        self.screen = Screen::new(page);
        self.generation += 1;
    }

    fn read_jobs(&self) -> Vec<Job> {
        self.screen
            .page
            .counter_targets()
            .into_iter()
            .map(|target| Job::ReadCount { target })
            .collect()
    }
}
