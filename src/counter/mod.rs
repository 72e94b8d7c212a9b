//! 阅读数装饰：计数器命名、远程计数服务与页面计数位。

pub mod client;
pub mod key;
pub mod slots;

pub use client::{CountApiClient, CounterService, DisabledCounter};
pub use key::CounterTarget;
pub use slots::{Applied, CountOutcome, CounterSlots};
