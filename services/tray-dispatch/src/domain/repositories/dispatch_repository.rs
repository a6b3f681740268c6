//! 发运单仓储接口
//!
//! 发运单集合的唯一数据源由外部存储方持有，领域服务只在其快照上计算。

use async_trait::async_trait;
use errors::AppResult;

use crate::domain::entities::{Dispatch, ReturnRecord, Shipment};
use crate::domain::enums::DispatchStatus;
use crate::domain::value_objects::{DispatchId, DispatchScope};

/// 发运单列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct DispatchFilter {
    pub status: Option<DispatchStatus>,
    pub company: Option<String>,
    /// 仅在范围完整时生效
    pub scope: Option<DispatchScope>,
}

impl DispatchFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn outstanding() -> Self {
        Self {
            status: Some(DispatchStatus::Outstanding),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: DispatchScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn matches(&self, dispatch: &Dispatch) -> bool {
        if let Some(status) = self.status {
            if dispatch.status() != status {
                return false;
            }
        }
        if let Some(company) = &self.company {
            if dispatch.company() != company {
                return false;
            }
        }
        match &self.scope {
            Some(scope) if scope.is_complete() => scope.contains(dispatch),
            _ => true,
        }
    }
}

/// 发运单仓储接口
#[async_trait]
pub trait DispatchRepository: Send + Sync {
    /// 列表查询（按发运时间倒序）
    async fn list(&self, filter: &DispatchFilter) -> AppResult<Vec<Dispatch>>;

    /// 根据 ID 查找
    async fn find_by_id(&self, id: DispatchId) -> AppResult<Option<Dispatch>>;

    /// 创建发运单，ID 由存储方分配
    async fn create(&self, shipment: Shipment) -> AppResult<Dispatch>;

    /// 登记归还
    ///
    /// 必须是原子的：读取状态、确认未归还、写入归还记录作为一个不可分割的单元。
    /// 发运单不存在返回 `NotFound`，已归还返回 `InvalidState`；失败时不产生任何修改。
    async fn update_return(&self, id: DispatchId, record: ReturnRecord) -> AppResult<Dispatch>;
}
