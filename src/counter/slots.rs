//! 页面上的计数展示位与结果写入规则。

use std::collections::HashMap;

use super::key::CounterTarget;

pub const PENDING_TEXT: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Value(i64),
}

impl SlotState {
    pub fn display(&self) -> String {
        match self {
            Self::Pending => PENDING_TEXT.to_string(),
            Self::Value(v) => format_count(*v),
        }
    }
}

/// 后台计数任务的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOutcome {
    /// 只读查询成功。
    Read(i64),
    /// 只读查询失败或响应无效。
    ReadFailed,
    /// 自增成功，返回新值。
    Hit(i64),
    /// 自增失败，附带章节 JSON 中的静态阅读数。
    HitFailed { fallback: i64 },
}

/// 写入结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Written(i64),
    /// 已有数值，失败结果不覆盖。
    Kept,
    /// 目标已不在当前页面。
    Gone,
}

/// 当前页面持有的全部计数位。页面重绘时整体替换。
#[derive(Debug, Default, Clone)]
pub struct CounterSlots {
    slots: HashMap<CounterTarget, SlotState>,
}

impl CounterSlots {
    pub fn with_targets<I>(targets: I) -> Self
    where
        I: IntoIterator<Item = CounterTarget>,
    {
        Self {
            slots: targets
                .into_iter()
                .map(|t| (t, SlotState::Pending))
                .collect(),
        }
    }

    pub fn get(&self, target: &CounterTarget) -> Option<SlotState> {
        self.slots.get(target).copied()
    }

    pub fn display(&self, target: &CounterTarget) -> String {
        self.get(target)
            .map(|s| s.display())
            .unwrap_or_else(|| PENDING_TEXT.to_string())
    }

    pub fn has_pending(&self) -> bool {
        self.slots.values().any(|s| *s == SlotState::Pending)
    }

    /// 成功结果直接覆盖；失败结果只在仍为占位符时写入兜底值。
    pub fn apply(&mut self, target: &CounterTarget, outcome: CountOutcome) -> Applied {
        let Some(slot) = self.slots.get_mut(target) else {
            return Applied::Gone;
        };
        let value = match outcome {
            CountOutcome::Read(v) | CountOutcome::Hit(v) => v,
            CountOutcome::ReadFailed | CountOutcome::HitFailed { .. }
                if *slot != SlotState::Pending =>
            {
                return Applied::Kept;
            }
            CountOutcome::ReadFailed => 0,
            CountOutcome::HitFailed { fallback } => fallback,
        };
        *slot = SlotState::Value(value);
        Applied::Written(value)
    }
}

/// 千分位格式化：`1234567` → `1,234,567`，负数保留符号。
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
