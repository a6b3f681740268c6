//! 通用类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 审计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditInfo {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// 以指定时间创建（用于从远端记录加载）
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn update(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for AuditInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// 分页参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 100,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)) * self.page_size
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }

    /// 从完整列表中截取当前页
    pub fn from_all(all: Vec<T>, pagination: &Pagination) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.page_size as usize)
            .collect();
        Self::new(items, total, pagination)
    }

    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        assert_eq!(Pagination::new(1, 20).offset(), 0);
        assert_eq!(Pagination::new(3, 20).offset(), 40);
        assert_eq!(Pagination::new(0, 20).offset(), 0);
    }

    #[test]
    fn test_paged_result_from_all() {
        let page = PagedResult::from_all((1..=45).collect::<Vec<u32>>(), &Pagination::new(3, 20));
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_audit_info_update() {
        let mut audit = AuditInfo::at(DateTime::<Utc>::UNIX_EPOCH);
        audit.update();
        assert_eq!(audit.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(audit.updated_at > audit.created_at);
    }
}
