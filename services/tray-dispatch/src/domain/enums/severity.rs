//! 未归还时长的严重程度分级

use serde::{Deserialize, Serialize};

/// 严重程度
///
/// 与逾期通知阈值相互独立，仅用于对账视图的标色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// `>7` 天为高，`>3` 天为中，其余为低
    pub fn from_days_out(days_out: i64) -> Self {
        if days_out > 7 {
            Severity::High
        } else if days_out > 3 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// 看板使用的颜色
    pub fn color(&self) -> &'static str {
        match self {
            Severity::High => "red",
            Severity::Medium => "amber",
            Severity::Low => "green",
        }
    }
}
