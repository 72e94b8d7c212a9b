use std::fmt;

const KEY_PREFIX: &str = "topaz_novel";

/// 计数服务中的计数器名，由小说 id（及章节号）确定性生成。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey(String);

impl CounterKey {
    /// 小说总阅读数。
    pub fn novel(novel_id: &str) -> Self {
        Self(format!("{KEY_PREFIX}_{novel_id}_main"))
    }

    /// 单章阅读数。`chapter_number` 为展示用章节号，不是数组下标。
    pub fn chapter(novel_id: &str, chapter_number: u32) -> Self {
        Self(format!("{KEY_PREFIX}_{novel_id}_chap_{chapter_number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 页面上一个计数展示位置。同一页面内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterTarget {
    /// 首页卡片上的阅读数。
    Card { novel_id: String },
    /// 详情页的总阅读数。
    NovelTotal { novel_id: String },
    /// 阅读页的本章阅读数。
    ChapterReads { novel_id: String, chapter_number: u32 },
}

impl CounterTarget {
    pub fn key(&self) -> CounterKey {
        match self {
            Self::Card { novel_id } | Self::NovelTotal { novel_id } => CounterKey::novel(novel_id),
            Self::ChapterReads {
                novel_id,
                chapter_number,
            } => CounterKey::chapter(novel_id, *chapter_number),
        }
    }
}
