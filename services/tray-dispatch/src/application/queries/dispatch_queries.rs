//! Dispatch queries

use chrono::{DateTime, Utc};
use common::Pagination;

use crate::domain::repositories::DispatchFilter;
use crate::domain::value_objects::{BoxCounts, DispatchId, DispatchScope};

/// 获取发运单查询
#[derive(Debug, Clone)]
pub struct GetDispatchQuery {
    pub dispatch_id: DispatchId,
}

/// 列表发运单查询
#[derive(Debug, Clone, Default)]
pub struct ListDispatchesQuery {
    pub filter: DispatchFilter,
    pub pagination: Pagination,
}

/// 可归还发运单查询（范围不完整时返回全部未归还）
#[derive(Debug, Clone, Default)]
pub struct ListReturnableQuery {
    pub scope: DispatchScope,
}

/// 归还前差异检查
#[derive(Debug, Clone)]
pub struct CheckReturnQuery {
    pub dispatch_id: DispatchId,
    pub returned_hq: i64,
    pub returned_nq: i64,
}

impl CheckReturnQuery {
    pub fn returned(&self) -> errors::AppResult<BoxCounts> {
        BoxCounts::try_from_signed(self.returned_hq, self.returned_nq)
    }
}

/// 库存统计查询
#[derive(Debug, Clone, Default)]
pub struct GetStatsQuery {
    pub scope: DispatchScope,
}

/// 逾期查询
#[derive(Debug, Clone)]
pub struct ListOverdueQuery {
    pub now: DateTime<Utc>,
}

/// 对账报告查询
#[derive(Debug, Clone, Default)]
pub struct GetReconciliationQuery {
    pub scope: DispatchScope,
}
