//! Business logic handler

use std::sync::Arc;

use chrono::Utc;
use common::PagedResult;
use errors::{AppError, AppResult};
use metrics::counter;
use tracing::{info, warn};

use crate::domain::entities::Dispatch;
use crate::domain::repositories::{DispatchFilter, DispatchRepository};
use crate::domain::services::{
    DIGEST_LIMIT, DEFAULT_OVERDUE_THRESHOLD_DAYS, DispatchAnalytics, InventoryStats,
    MismatchDetails, OverdueDigest, ReconciliationReport, build_overdue_digest,
    build_reconciliation, compute_stats, detect_mismatch, find_overdue, summarize_dispatches,
};
use crate::domain::value_objects::{BaseInventory, DispatchId};

use super::commands::*;
use super::queries::*;

/// 库存策略（会话期内不变）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySettings {
    pub base_inventory: BaseInventory,
    pub overdue_threshold_days: i64,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            base_inventory: config::BaseInventoryConfig::default().into(),
            overdue_threshold_days: DEFAULT_OVERDUE_THRESHOLD_DAYS,
        }
    }
}

impl From<&config::InventoryConfig> for InventorySettings {
    fn from(cfg: &config::InventoryConfig) -> Self {
        Self {
            base_inventory: cfg.base_inventory.into(),
            overdue_threshold_days: cfg.overdue_threshold_days,
        }
    }
}

pub struct ServiceHandler {
    dispatch_repo: Arc<dyn DispatchRepository>,
    settings: InventorySettings,
}

impl ServiceHandler {
    pub fn new(dispatch_repo: Arc<dyn DispatchRepository>, settings: InventorySettings) -> Self {
        Self {
            dispatch_repo,
            settings,
        }
    }

    pub fn settings(&self) -> &InventorySettings {
        &self.settings
    }

    // ========== 发运 ==========

    /// 创建发运单
    pub async fn create_dispatch(&self, cmd: CreateDispatchCommand) -> AppResult<Dispatch> {
        info!(
            project_id = %cmd.project_id,
            drillhole_id = %cmd.drillhole_id,
            company = %cmd.company,
            "Creating dispatch"
        );

        let shipment = cmd.into_shipment(Utc::now())?;
        let dispatch = self.dispatch_repo.create(shipment).await.inspect_err(|e| {
            warn!(error = %e, "Failed to create dispatch");
        })?;

        counter!("tray_dispatches_created_total").increment(1);
        info!(dispatch_id = %dispatch.dispatch_id(), "Dispatch created");
        Ok(dispatch)
    }

    /// 获取发运单
    pub async fn get_dispatch(&self, query: GetDispatchQuery) -> AppResult<Dispatch> {
        self.load(query.dispatch_id).await
    }

    /// 列表发运单
    pub async fn list_dispatches(
        &self,
        query: ListDispatchesQuery,
    ) -> AppResult<PagedResult<Dispatch>> {
        let dispatches = self.dispatch_repo.list(&query.filter).await?;
        Ok(PagedResult::from_all(dispatches, &query.pagination))
    }

    /// 可选择归还的发运单
    pub async fn list_returnable(&self, query: ListReturnableQuery) -> AppResult<Vec<Dispatch>> {
        let mut filter = DispatchFilter::outstanding();
        if query.scope.is_complete() {
            filter = filter.with_scope(query.scope);
        }
        self.dispatch_repo.list(&filter).await
    }

    // ========== 归还 ==========

    /// 归还前差异检查
    ///
    /// 不修改任何数据；返回 `Some` 表示提交前需要用户确认。
    pub async fn check_return(&self, query: CheckReturnQuery) -> AppResult<Option<MismatchDetails>> {
        let returned = query.returned()?;
        let dispatch = self.load(query.dispatch_id).await?;
        if dispatch.is_returned() {
            return Err(AppError::invalid_state(format!(
                "dispatch {} is already returned",
                dispatch.dispatch_id()
            )));
        }

        let mismatch = detect_mismatch(&dispatch, returned);
        if let Some(details) = &mismatch {
            info!(
                dispatch_id = %query.dispatch_id,
                hq_diff = details.hq_diff,
                nq_diff = details.nq_diff,
                "Return quantity mismatch requires confirmation"
            );
        }
        Ok(mismatch)
    }

    /// 登记归还
    ///
    /// 状态检查与写入由仓储原子完成；仓储失败时不做任何本地修改。
    pub async fn process_return(&self, cmd: ProcessReturnCommand) -> AppResult<Dispatch> {
        info!(dispatch_id = %cmd.dispatch_id, "Processing return");

        let record = cmd.to_record(Utc::now())?;

        let dispatch = match self.dispatch_repo.update_return(cmd.dispatch_id, record).await {
            Ok(dispatch) => dispatch,
            Err(e) => {
                warn!(dispatch_id = %cmd.dispatch_id, error = %e, "Return rejected");
                counter!("tray_return_rejections_total", "reason" => e.kind()).increment(1);
                return Err(e);
            }
        };

        let outcome = if dispatch.has_discrepancy() {
            "discrepancy"
        } else {
            "matched"
        };
        counter!("tray_returns_processed_total", "outcome" => outcome).increment(1);
        info!(dispatch_id = %cmd.dispatch_id, outcome, "Return processed");
        Ok(dispatch)
    }

    // ========== 统计与对账 ==========

    /// 库存统计
    pub async fn get_stats(&self, query: GetStatsQuery) -> AppResult<InventoryStats> {
        let dispatches = self.dispatch_repo.list(&DispatchFilter::all()).await?;
        Ok(compute_stats(
            &dispatches,
            self.settings.base_inventory,
            &query.scope,
        ))
    }

    /// 逾期发运单
    pub async fn list_overdue(&self, query: ListOverdueQuery) -> AppResult<Vec<Dispatch>> {
        let dispatches = self.dispatch_repo.list(&DispatchFilter::outstanding()).await?;
        Ok(find_overdue(
            &dispatches,
            query.now,
            self.settings.overdue_threshold_days,
        ))
    }

    /// 逾期通知摘要
    pub async fn overdue_digest(&self, query: ListOverdueQuery) -> AppResult<OverdueDigest> {
        let dispatches = self.dispatch_repo.list(&DispatchFilter::outstanding()).await?;
        let digest = build_overdue_digest(
            &dispatches,
            query.now,
            self.settings.overdue_threshold_days,
            DIGEST_LIMIT,
        );
        if !digest.is_empty() {
            warn!(
                overdue = digest.total,
                threshold_days = self.settings.overdue_threshold_days,
                "Overdue dispatches"
            );
        }
        Ok(digest)
    }

    /// 对账报告（范围不完整时为空）
    pub async fn get_reconciliation(
        &self,
        query: GetReconciliationQuery,
    ) -> AppResult<ReconciliationReport> {
        if !query.scope.is_complete() {
            return Ok(ReconciliationReport::default());
        }
        let filter = DispatchFilter::all().with_scope(query.scope);
        let dispatches = self.dispatch_repo.list(&filter).await?;
        Ok(build_reconciliation(&dispatches))
    }

    /// 分布统计
    pub async fn get_analytics(&self) -> AppResult<DispatchAnalytics> {
        let dispatches = self.dispatch_repo.list(&DispatchFilter::all()).await?;
        Ok(summarize_dispatches(&dispatches))
    }

    async fn load(&self, id: DispatchId) -> AppResult<Dispatch> {
        self.dispatch_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("dispatch {} not found", id)))
    }
}
