//! 对账报告

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Dispatch;
use crate::domain::enums::Severity;
use crate::domain::services::days_out;
use crate::domain::value_objects::DispatchId;

/// 对账报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// 未归还发运单，最早发出的在前
    pub outstanding: Vec<Dispatch>,
    /// 已归还但数量不一致的发运单，按 ID 排序
    pub discrepancies: Vec<Dispatch>,
}

/// 带时长分级的未归还条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgedDispatch {
    pub dispatch_id: DispatchId,
    pub days_out: i64,
    pub severity: Severity,
}

/// 差异明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyLine {
    pub dispatch_id: DispatchId,
    pub hq_dispatched: u32,
    pub hq_returned: u32,
    /// 发出 - 归还
    pub hq_difference: i64,
    pub nq_dispatched: u32,
    pub nq_returned: u32,
    pub nq_difference: i64,
    pub notes: Option<String>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.outstanding.is_empty() && self.discrepancies.is_empty()
    }

    /// 为未归还条目标注天数和严重程度
    pub fn aged_outstanding(&self, now: DateTime<Utc>) -> Vec<AgedDispatch> {
        self.outstanding
            .iter()
            .map(|d| {
                let days = days_out(d.dispatch_date(), now);
                AgedDispatch {
                    dispatch_id: d.dispatch_id(),
                    days_out: days,
                    severity: Severity::from_days_out(days),
                }
            })
            .collect()
    }

    pub fn discrepancy_lines(&self) -> Vec<DiscrepancyLine> {
        self.discrepancies
            .iter()
            .map(|d| DiscrepancyLine {
                dispatch_id: d.dispatch_id(),
                hq_dispatched: d.hq_boxes(),
                hq_returned: d.returned_hq(),
                hq_difference: i64::from(d.hq_boxes()) - i64::from(d.returned_hq()),
                nq_dispatched: d.nq_boxes(),
                nq_returned: d.returned_nq(),
                nq_difference: i64::from(d.nq_boxes()) - i64::from(d.returned_nq()),
                notes: d.return_record().and_then(|r| r.notes.clone()),
            })
            .collect()
    }
}

/// 构建对账报告
///
/// 调用方负责事先按范围过滤；这里只按状态和数量分类。
pub fn build_reconciliation(dispatches: &[Dispatch]) -> ReconciliationReport {
    let mut outstanding: Vec<Dispatch> = dispatches
        .iter()
        .filter(|d| d.is_outstanding())
        .cloned()
        .collect();
    outstanding.sort_by_key(|d| (d.dispatch_date(), d.dispatch_id()));

    let mut discrepancies: Vec<Dispatch> = dispatches
        .iter()
        .filter(|d| d.has_discrepancy())
        .cloned()
        .collect();
    discrepancies.sort_by_key(|d| d.dispatch_id());

    ReconciliationReport {
        outstanding,
        discrepancies,
    }
}
