//! 内存发运单仓储
//!
//! 单进程共享存储；归还在同一把写锁内完成状态检查与写入，保证同一发运单的并发归还只有一个成功。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use errors::{AppError, AppResult};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{Dispatch, ReturnRecord, Shipment};
use crate::domain::repositories::{DispatchFilter, DispatchRepository};
use crate::domain::value_objects::DispatchId;
use crate::infrastructure::api::converters::dispatch_from_row;
use crate::infrastructure::api::rows::DispatchRow;

pub struct InMemoryDispatchRepository {
    dispatches: Arc<RwLock<BTreeMap<DispatchId, Dispatch>>>,
    next_id: AtomicI64,
}

impl InMemoryDispatchRepository {
    pub fn new() -> Self {
        Self {
            dispatches: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    /// 以已有发运单初始化，新 ID 从最大 ID 之后开始分配
    pub fn with_dispatches(dispatches: impl IntoIterator<Item = Dispatch>) -> Self {
        let map: BTreeMap<DispatchId, Dispatch> = dispatches
            .into_iter()
            .map(|d| (d.dispatch_id(), d))
            .collect();
        let next = map.keys().next_back().map_or(1, |id| id.value() + 1);
        Self {
            dispatches: Arc::new(RwLock::new(map)),
            next_id: AtomicI64::new(next),
        }
    }

    /// 从远端列表格式的 JSON 数组初始化，ID 重复视为错误
    pub fn from_seed_json(json: &str) -> AppResult<Self> {
        let rows: Vec<DispatchRow> = serde_json::from_str(json)
            .map_err(|e| AppError::validation(format!("invalid seed data: {}", e)))?;

        let mut dispatches = BTreeMap::new();
        for row in rows {
            let dispatch = dispatch_from_row(row, None)?;
            let id = dispatch.dispatch_id();
            if dispatches.insert(id, dispatch).is_some() {
                return Err(AppError::validation(format!("duplicate seed dispatch {}", id)));
            }
        }
        debug!(count = dispatches.len(), "Seed dispatches loaded");
        Ok(Self::with_dispatches(dispatches.into_values()))
    }

    /// 当前快照
    pub async fn snapshot(&self) -> Vec<Dispatch> {
        self.dispatches.read().await.values().cloned().collect()
    }
}

impl Default for InMemoryDispatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchRepository for InMemoryDispatchRepository {
    async fn list(&self, filter: &DispatchFilter) -> AppResult<Vec<Dispatch>> {
        let dispatches = self.dispatches.read().await;
        let mut result: Vec<Dispatch> = dispatches
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.dispatch_date()
                .cmp(&a.dispatch_date())
                .then(b.dispatch_id().cmp(&a.dispatch_id()))
        });
        Ok(result)
    }

    async fn find_by_id(&self, id: DispatchId) -> AppResult<Option<Dispatch>> {
        Ok(self.dispatches.read().await.get(&id).cloned())
    }

    async fn create(&self, shipment: Shipment) -> AppResult<Dispatch> {
        let id = DispatchId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let dispatch = Dispatch::new(id, shipment);
        self.dispatches.write().await.insert(id, dispatch.clone());
        debug!(dispatch_id = %id, "Dispatch stored");
        Ok(dispatch)
    }

    async fn update_return(&self, id: DispatchId, record: ReturnRecord) -> AppResult<Dispatch> {
        let mut dispatches = self.dispatches.write().await;
        let dispatch = dispatches
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("dispatch {} not found", id)))?;
        dispatch.mark_returned(record)?;
        debug!(dispatch_id = %id, "Return stored");
        Ok(dispatch.clone())
    }
}
