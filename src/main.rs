//! Topaz 小说阅读器（终端版）。
//!
//! 从静态 JSON 书库读取小说清单与详情，提供首页网格、详情目录与分章阅读，
//! 并在后台向计数服务查询/上报阅读数。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置与日志
//! - `catalog`：书库数据模型与资源读取
//! - `counter`：计数器命名、计数服务客户端、页面计数位
//! - `view`：导航状态与视图模型渲染
//! - `controller`：导航控制与后台任务
//! - `ui`：终端界面

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

mod base_system;
mod catalog;
mod controller;
mod counter;
mod ui;
mod view;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use catalog::{LibraryLocation, open_source};
use controller::{Navigator, Services};
use counter::{CountApiClient, CounterService, DisabledCounter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "topaz-reader")]
#[command(about = "Topaz novel reader (terminal UI)")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 数据目录路径（用于存放 config.yml 和 logs）
    #[arg(long)]
    data_dir: Option<String>,

    /// 书库位置（本地目录或 http(s) 地址），覆盖配置文件
    #[arg(long)]
    library: Option<String>,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("Topaz Reader v{VERSION}");
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    let _log = LogSystem::init(
        LogOptions {
            debug: cli.debug,
            archive_on_exit: true,
        },
        data_dir,
    )
    .map_err(|e| anyhow!(e))?;

    let mut config: Config = load_or_create(data_dir).context("load config.yml")?;
    if let Some(library) = cli.library {
        config.library = library;
    }

    let location = LibraryLocation::parse(&config.library)?;
    let timeout = config.request_timeout();
    let library = open_source(&location, timeout)?;
    let counter: Arc<dyn CounterService> = if config.counter_enabled {
        Arc::new(
            CountApiClient::new(&config.counter_base_url, &config.counter_namespace, timeout)
                .context("init counter client")?,
        )
    } else {
        info!(target: "startup", "阅读数计数已关闭");
        Arc::new(DisabledCounter)
    };

    info!(target: "startup", "当前版本: v{VERSION}");
    info!(target: "startup", library = %location.describe(), sort = %config.default_sort, "书库");

    let nav = Navigator::new(config.default_sort);
    ui::tui::run(nav, Services { library, counter }, location.describe())
}
