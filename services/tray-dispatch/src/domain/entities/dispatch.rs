//! 发运单聚合根

use chrono::{DateTime, Utc};
use common::AuditInfo;
use domain_core::{AggregateRoot, Entity, Lifecycle};
use errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::enums::{DispatchStatus, ReturnCondition};
use crate::domain::value_objects::{BoxCounts, DispatchId, DispatchScope};

/// 发运事实（创建时写入一次，之后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub project_id: String,
    pub drillhole_id: String,
    pub company: String,
    pub dispatch_date: DateTime<Utc>,
    pub boxes: BoxCounts,
    pub driver: String,
    pub technician: String,
    pub samples_collected: u32,
    pub sample_type: String,
}

/// 归还事实
///
/// 在迁移到 `Returned` 时作为一个整体写入，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub return_date: DateTime<Utc>,
    pub returned: BoxCounts,
    pub condition: ReturnCondition,
    pub notes: Option<String>,
    pub driver: Option<String>,
    pub technician: Option<String>,
}

/// 发运单聚合根
///
/// 状态由是否存在归还记录推导，因此不存在“已归还但缺少归还字段”的情况。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    id: DispatchId,
    shipment: Shipment,
    return_record: Option<ReturnRecord>,
    audit_info: AuditInfo,
}

impl Dispatch {
    /// 创建新的未归还发运单
    pub fn new(id: DispatchId, shipment: Shipment) -> Self {
        Self {
            id,
            shipment,
            return_record: None,
            audit_info: AuditInfo::default(),
        }
    }

    /// 从各部分构建（用于从远端记录加载）
    pub fn from_parts(
        id: DispatchId,
        shipment: Shipment,
        return_record: Option<ReturnRecord>,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            shipment,
            return_record,
            audit_info,
        }
    }

    // ========== 状态迁移 ==========

    /// 登记归还
    ///
    /// 只允许 `Outstanding -> Returned`；对已归还的发运单返回 `InvalidState`，且不做任何修改。
    pub fn mark_returned(&mut self, record: ReturnRecord) -> AppResult<()> {
        if !self.can_transition_to(DispatchStatus::Returned) {
            return Err(AppError::invalid_state(format!(
                "dispatch {} is already returned",
                self.id
            )));
        }
        self.return_record = Some(record);
        self.touch();
        Ok(())
    }

    // ========== 查询方法 ==========

    pub fn dispatch_id(&self) -> DispatchId {
        self.id
    }

    pub fn shipment(&self) -> &Shipment {
        &self.shipment
    }

    pub fn project_id(&self) -> &str {
        &self.shipment.project_id
    }

    pub fn drillhole_id(&self) -> &str {
        &self.shipment.drillhole_id
    }

    pub fn scope(&self) -> DispatchScope {
        DispatchScope::hole(&self.shipment.project_id, &self.shipment.drillhole_id)
    }

    pub fn company(&self) -> &str {
        &self.shipment.company
    }

    pub fn dispatch_date(&self) -> DateTime<Utc> {
        self.shipment.dispatch_date
    }

    pub fn boxes(&self) -> BoxCounts {
        self.shipment.boxes
    }

    pub fn hq_boxes(&self) -> u32 {
        self.shipment.boxes.hq
    }

    pub fn nq_boxes(&self) -> u32 {
        self.shipment.boxes.nq
    }

    pub fn driver(&self) -> &str {
        &self.shipment.driver
    }

    pub fn technician(&self) -> &str {
        &self.shipment.technician
    }

    pub fn samples_collected(&self) -> u32 {
        self.shipment.samples_collected
    }

    pub fn sample_type(&self) -> &str {
        &self.shipment.sample_type
    }

    pub fn status(&self) -> DispatchStatus {
        if self.return_record.is_some() {
            DispatchStatus::Returned
        } else {
            DispatchStatus::Outstanding
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.return_record.is_none()
    }

    pub fn is_returned(&self) -> bool {
        self.return_record.is_some()
    }

    pub fn return_record(&self) -> Option<&ReturnRecord> {
        self.return_record.as_ref()
    }

    pub fn return_date(&self) -> Option<DateTime<Utc>> {
        self.return_record.as_ref().map(|r| r.return_date)
    }

    /// 归还数量；未归还时为 0
    pub fn returned(&self) -> BoxCounts {
        self.return_record
            .as_ref()
            .map(|r| r.returned)
            .unwrap_or_default()
    }

    pub fn returned_hq(&self) -> u32 {
        self.returned().hq
    }

    pub fn returned_nq(&self) -> u32 {
        self.returned().nq
    }

    /// 已归还且数量与发出一致；未归还时为 `None`
    pub fn is_match(&self) -> Option<bool> {
        self.return_record
            .as_ref()
            .map(|r| r.returned == self.shipment.boxes)
    }

    /// 已归还且数量不一致
    pub fn has_discrepancy(&self) -> bool {
        self.is_match() == Some(false)
    }
}

// ========== Entity/AggregateRoot trait 实现 ==========

impl Entity for Dispatch {
    type Id = DispatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Dispatch {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl Lifecycle for Dispatch {
    type State = DispatchStatus;

    fn state(&self) -> DispatchStatus {
        self.status()
    }

    fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    fn can_transition_to(&self, next: DispatchStatus) -> bool {
        self.status().can_transition_to(next)
    }
}
