//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};
use crate::view::SortBy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 书库
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default)]
    pub default_sort: SortBy,

    // 阅读数
    #[serde(default = "default_true")]
    pub counter_enabled: bool,
    #[serde(default = "default_counter_base_url")]
    pub counter_base_url: String,
    #[serde(default = "default_counter_namespace")]
    pub counter_namespace: String,

    // 网络
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: default_library(),
            default_sort: SortBy::default(),
            counter_enabled: default_true(),
            counter_base_url: default_counter_base_url(),
            counter_namespace: default_counter_namespace(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 6] = [
            FieldMeta {
                name: "library",
                description: "书库位置：本地目录或 http(s) 地址，需包含 manifest.json 与 <id>.json",
            },
            FieldMeta {
                name: "default_sort",
                description: "首页默认排序（popular/latest）",
            },
            FieldMeta {
                name: "counter_enabled",
                description: "是否向计数服务查询/上报阅读数",
            },
            FieldMeta {
                name: "counter_base_url",
                description: "计数服务地址",
            },
            FieldMeta {
                name: "counter_namespace",
                description: "计数服务命名空间",
            },
            FieldMeta {
                name: "request_timeout",
                description: "请求超时时间（秒）",
            },
        ];
        &FIELDS
    }
}

impl Config {
    /// 为 0 时回退到默认值，避免请求立即超时。
    pub fn request_timeout(&self) -> Duration {
        let secs = if self.request_timeout == 0 {
            default_request_timeout()
        } else {
            self.request_timeout
        };
        Duration::from_secs(secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_library() -> String {
    "novels".to_string()
}

fn default_counter_base_url() -> String {
    "https://api.countapi.xyz".to_string()
}

fn default_counter_namespace() -> String {
    "topaz-novels-test".to_string()
}

fn default_request_timeout() -> u64 {
    15
}
