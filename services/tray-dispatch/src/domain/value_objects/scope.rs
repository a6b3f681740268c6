//! 钻孔范围（项目 + 钻孔）

use serde::{Deserialize, Serialize};

use crate::domain::entities::Dispatch;

/// 聚合范围
///
/// 只有项目和钻孔都已选定时才算完整；不完整的范围不包含任何发运单。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchScope {
    pub project_id: Option<String>,
    pub drillhole_id: Option<String>,
}

impl DispatchScope {
    /// 未选择任何范围
    pub fn none() -> Self {
        Self::default()
    }

    pub fn hole(project_id: impl Into<String>, drillhole_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            drillhole_id: Some(drillhole_id.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(
            (self.project_id.as_deref(), self.drillhole_id.as_deref()),
            (Some(p), Some(h)) if !p.trim().is_empty() && !h.trim().is_empty()
        )
    }

    /// 发运单是否落在该范围内（不完整范围恒为 false）
    pub fn contains(&self, dispatch: &Dispatch) -> bool {
        match (self.project_id.as_deref(), self.drillhole_id.as_deref()) {
            (Some(project), Some(hole)) if self.is_complete() => {
                dispatch.project_id() == project && dispatch.drillhole_id() == hole
            }
            _ => false,
        }
    }

    /// 过滤出范围内的发运单
    pub fn select<'a>(&self, dispatches: &'a [Dispatch]) -> Vec<&'a Dispatch> {
        dispatches.iter().filter(|d| self.contains(d)).collect()
    }
}
