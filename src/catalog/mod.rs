//! 书库：清单与详情资源的数据模型、读取与缓存。

pub mod models;
pub mod source;
pub mod store;

pub use models::{NovelDetail, NovelSummary};
pub use source::{CatalogError, LibraryLocation, LibrarySource, open_source};
pub use store::CatalogStore;
