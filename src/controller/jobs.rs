//! 后台任务：读取书库资源与计数服务。
//!
//! 每个任务在独立线程上执行，结果经由通道交回 UI 线程，由
//! [`Navigator::complete`](super::Navigator::complete) 统一写入。

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::catalog::{CatalogError, LibrarySource, NovelDetail, NovelSummary};
use crate::counter::{CountOutcome, CounterService, CounterTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    LoadManifest,
    LoadDetail { novel_id: String },
    ReadCount { target: CounterTarget },
    HitCount { target: CounterTarget, fallback: i64 },
}

#[derive(Debug)]
pub enum JobDone {
    Manifest(Result<Vec<NovelSummary>, CatalogError>),
    Detail {
        novel_id: String,
        result: Result<NovelDetail, CatalogError>,
    },
    Count {
        target: CounterTarget,
        outcome: CountOutcome,
    },
}

/// 后台任务用到的外部服务。
#[derive(Clone)]
pub struct Services {
    pub library: Arc<dyn LibrarySource>,
    pub counter: Arc<dyn CounterService>,
}

pub fn execute(job: &Job, services: &Services) -> JobDone {
    match job {
        Job::LoadManifest => JobDone::Manifest(services.library.fetch_manifest()),
        Job::LoadDetail { novel_id } => JobDone::Detail {
            novel_id: novel_id.clone(),
            result: services.library.fetch_detail(novel_id),
        },
        Job::ReadCount { target } => {
            let outcome = match services.counter.info(&target.key()) {
                Ok(v) => CountOutcome::Read(v),
                Err(err) => {
                    debug!(target: "counter", key = %target.key(), "计数查询失败: {err}");
                    CountOutcome::ReadFailed
                }
            };
            JobDone::Count {
                target: target.clone(),
                outcome,
            }
        }
        Job::HitCount { target, fallback } => {
            let outcome = match services.counter.hit(&target.key()) {
                Ok(v) => {
                    debug!(target: "counter", key = %target.key(), value = v, "阅读已计数");
                    CountOutcome::Hit(v)
                }
                Err(err) => {
                    debug!(target: "counter", key = %target.key(), "计数自增失败: {err}");
                    CountOutcome::HitFailed {
                        fallback: *fallback,
                    }
                }
            };
            JobDone::Count {
                target: target.clone(),
                outcome,
            }
        }
    }
}

/// 启动后不等待、不取消；接收端已关闭时结果被丢弃。
pub fn spawn(job: Job, services: &Services, tx: &Sender<JobDone>) {
    let services = services.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let done = execute(&job, &services);
        let _ = tx.send(done);
    });
}
