//! 导航状态与视图模型渲染。

pub mod page;
pub mod render;
pub mod state;

pub use page::{FATAL_LOAD_MESSAGE, Page, Screen};
pub use render::{DetailView, HomeView, ReaderView, render_detail, render_home, render_reader};
pub use state::{SortBy, Transition, View, ViewState};
