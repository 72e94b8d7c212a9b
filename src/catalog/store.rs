use tracing::info;

use super::models::NovelSummary;

/// 启动时载入一次的书库清单，会话期间只读。
#[derive(Debug, Default)]
pub struct CatalogStore {
    novels: Vec<NovelSummary>,
    loaded: bool,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 后台线程取回清单后由 UI 线程装入。重复装入会被忽略。
    pub fn install(&mut self, novels: Vec<NovelSummary>) {
        if self.loaded {
            return;
        }
        info!(target: "catalog", count = novels.len(), "书库清单已载入");
        self.novels = novels;
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn novels(&self) -> &[NovelSummary] {
        &self.novels
    }
}
