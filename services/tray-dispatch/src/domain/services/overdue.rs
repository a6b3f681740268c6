//! 逾期判定与通知摘要

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Dispatch;
use crate::domain::value_objects::DispatchId;

/// 默认逾期通知阈值（天）
pub const DEFAULT_OVERDUE_THRESHOLD_DAYS: i64 = 10;

/// 通知面板最多展示的条数
pub const DIGEST_LIMIT: usize = 5;

const SECONDS_PER_DAY: i64 = 86_400;

/// 已发出天数，向下取整
///
/// 发运时间晚于 `now` 时结果为负（向负无穷取整，哪怕只晚 1 纳秒）。
pub fn days_out(dispatch_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = now - dispatch_date;
    // num_seconds 向零截断，负时长的小数部分要再退一秒
    let seconds = elapsed.num_seconds() - i64::from(elapsed.subsec_nanos() < 0);
    seconds.div_euclid(SECONDS_PER_DAY)
}

/// 是否逾期：未归还，且已发出时长严格大于阈值
///
/// 按精确时长比较，恰好 10 天不算逾期，10 天零 1 秒算逾期。
pub fn is_overdue(dispatch: &Dispatch, now: DateTime<Utc>, threshold_days: i64) -> bool {
    if !dispatch.is_outstanding() {
        return false;
    }
    match TimeDelta::try_days(threshold_days) {
        Some(threshold) => now - dispatch.dispatch_date() > threshold,
        None => false,
    }
}

/// 筛选逾期发运单（保持输入顺序）
pub fn find_overdue(dispatches: &[Dispatch], now: DateTime<Utc>, threshold_days: i64) -> Vec<Dispatch> {
    dispatches
        .iter()
        .filter(|d| is_overdue(d, now, threshold_days))
        .cloned()
        .collect()
}

/// 通知条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueEntry {
    pub dispatch_id: DispatchId,
    pub project_id: String,
    pub drillhole_id: String,
    pub company: String,
    pub days_out: i64,
}

/// 逾期通知摘要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueDigest {
    /// 逾期总数
    pub total: usize,
    /// 展示的条目（最久的在前）
    pub shown: Vec<OverdueEntry>,
    /// 未展示的条数
    pub remaining: usize,
}

impl OverdueDigest {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// 面板标题文案
    pub fn headline(&self, threshold_days: i64) -> String {
        let subject = if self.total == 1 {
            "dispatch has"
        } else {
            "dispatches have"
        };
        format!(
            "{} {} been outstanding for more than {} days",
            self.total, subject, threshold_days
        )
    }
}

/// 构建逾期通知摘要
pub fn build_overdue_digest(
    dispatches: &[Dispatch],
    now: DateTime<Utc>,
    threshold_days: i64,
    limit: usize,
) -> OverdueDigest {
    let mut overdue: Vec<&Dispatch> = dispatches
        .iter()
        .filter(|d| is_overdue(d, now, threshold_days))
        .collect();
    overdue.sort_by_key(|d| (d.dispatch_date(), d.dispatch_id()));

    let total = overdue.len();
    let shown: Vec<OverdueEntry> = overdue
        .into_iter()
        .take(limit)
        .map(|d| OverdueEntry {
            dispatch_id: d.dispatch_id(),
            project_id: d.project_id().to_string(),
            drillhole_id: d.drillhole_id().to_string(),
            company: d.company().to_string(),
            days_out: days_out(d.dispatch_date(), now),
        })
        .collect();

    OverdueDigest {
        total,
        remaining: total - shown.len(),
        shown,
    }
}
