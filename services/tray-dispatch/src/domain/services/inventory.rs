//! 库存汇总

use serde::{Deserialize, Serialize};

use crate::domain::entities::Dispatch;
use crate::domain::value_objects::{BaseInventory, DispatchScope, InventoryLevel};

/// 发出数量合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTotals {
    pub hq: u64,
    pub nq: u64,
    pub samples: u64,
}

impl DispatchTotals {
    fn accumulate(mut self, dispatch: &Dispatch) -> Self {
        self.hq += u64::from(dispatch.hq_boxes());
        self.nq += u64::from(dispatch.nq_boxes());
        self.samples += u64::from(dispatch.samples_collected());
        self
    }
}

/// 托盘数量合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxTotals {
    pub hq: u64,
    pub nq: u64,
}

/// 库存统计（每次读取时重新计算，不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// 范围内全部发运单的发出合计
    pub total_dispatched: DispatchTotals,
    /// 范围内已归还发运单的归还合计
    pub total_returned: BoxTotals,
    /// 范围内未归还发运单数
    pub outstanding: usize,
    /// 范围内未归还发运单的发出合计
    pub outstanding_total: DispatchTotals,
    /// 范围内已归还发运单数
    pub completed: usize,
    /// 范围内数量完全一致的归还占比（百分比）；没有归还时为 100
    pub match_rate: f64,
    /// 全局可用库存，与范围无关
    pub available: InventoryLevel,
}

impl InventoryStats {
    /// 看板显示用，保留一位小数
    pub fn match_rate_label(&self) -> String {
        format!("{:.1}", self.match_rate)
    }
}

/// 计算库存统计
///
/// 范围不完整时范围内集合为空：范围合计全部为 0，匹配率为 100。
/// `available` 始终基于全部发运单计算。
pub fn compute_stats(
    dispatches: &[Dispatch],
    base: BaseInventory,
    scope: &DispatchScope,
) -> InventoryStats {
    let in_scope = scope.select(dispatches);

    let total_dispatched = in_scope
        .iter()
        .fold(DispatchTotals::default(), |acc, d| acc.accumulate(d));

    let (returned, outstanding): (Vec<&Dispatch>, Vec<&Dispatch>) =
        in_scope.iter().copied().partition(|d| d.is_returned());

    let total_returned = returned.iter().fold(BoxTotals::default(), |acc, d| BoxTotals {
        hq: acc.hq + u64::from(d.returned_hq()),
        nq: acc.nq + u64::from(d.returned_nq()),
    });

    let outstanding_total = outstanding
        .iter()
        .fold(DispatchTotals::default(), |acc, d| acc.accumulate(d));

    let matched = returned.iter().filter(|d| d.is_match() == Some(true)).count();

    InventoryStats {
        total_dispatched,
        total_returned,
        outstanding: outstanding.len(),
        outstanding_total,
        completed: returned.len(),
        match_rate: match_rate(matched, returned.len()),
        available: available_inventory(dispatches, base),
    }
}

/// 全部未归还发运单占用的托盘
pub fn global_outstanding(dispatches: &[Dispatch]) -> BoxTotals {
    dispatches
        .iter()
        .filter(|d| d.is_outstanding())
        .fold(BoxTotals::default(), |acc, d| BoxTotals {
            hq: acc.hq + u64::from(d.hq_boxes()),
            nq: acc.nq + u64::from(d.nq_boxes()),
        })
}

/// 可用库存 = 基础库存 - 全局未归还
pub fn available_inventory(dispatches: &[Dispatch], base: BaseInventory) -> InventoryLevel {
    let out = global_outstanding(dispatches);
    InventoryLevel {
        hq: i64::from(base.hq) - out.hq as i64,
        nq: i64::from(base.nq) - out.nq as i64,
    }
}

fn match_rate(matched: usize, completed: usize) -> f64 {
    if completed == 0 {
        return 100.0;
    }
    matched as f64 / completed as f64 * 100.0
}
