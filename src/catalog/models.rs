//! 书库 JSON 资源对应的数据结构。

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// 书库清单（manifest.json）中的一条记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub is_ended: bool,
    #[serde(default)]
    pub total_chapters: u32,
}

impl NovelSummary {
    /// `lastUpdate` 解析后的时间点；无法解析时为 `None`（排序时视为最旧）。
    pub fn updated_at(&self) -> Option<OffsetDateTime> {
        parse_update_time(&self.last_update)
    }
}

/// 单本小说详情（`<id>.json`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub chapters: Vec<ChapterSummary>,
}

impl NovelDetail {
    pub fn chapter(&self, index: usize) -> Option<&ChapterSummary> {
        self.chapters.get(index)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.chapters.len().checked_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub chapter_number: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// 计数服务不可用时展示的静态阅读数。
    #[serde(default)]
    pub views: Option<i64>,
}

fn parse_update_time(raw: &str) -> Option<OffsetDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    let day = format_description!("[year]-[month]-[day]");
    Date::parse(s, day)
        .ok()
        .map(|d| d.midnight().assume_utc())
}
