//! 托盘数量

use serde::{Deserialize, Serialize};

use errors::{AppError, AppResult};

/// HQ/NQ 托盘数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxCounts {
    pub hq: u32,
    pub nq: u32,
}

impl BoxCounts {
    pub fn new(hq: u32, nq: u32) -> Self {
        Self { hq, nq }
    }

    /// 从外部输入构造，负数返回校验错误
    pub fn try_from_signed(hq: i64, nq: i64) -> AppResult<Self> {
        Ok(Self {
            hq: non_negative("hq", hq)?,
            nq: non_negative("nq", nq)?,
        })
    }

    pub fn total(&self) -> u64 {
        u64::from(self.hq) + u64::from(self.nq)
    }

    pub fn is_zero(&self) -> bool {
        self.hq == 0 && self.nq == 0
    }
}

fn non_negative(field: &str, value: i64) -> AppResult<u32> {
    if value < 0 {
        return Err(AppError::validation(format!(
            "{} box count must be >= 0, got {}",
            field, value
        )));
    }
    u32::try_from(value).map_err(|_| {
        AppError::validation(format!("{} box count {} is out of range", field, value))
    })
}

/// 站点拥有的托盘总量（会话期内不变）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseInventory {
    pub hq: u32,
    pub nq: u32,
}

impl BaseInventory {
    pub fn new(hq: u32, nq: u32) -> Self {
        Self { hq, nq }
    }
}

impl From<config::BaseInventoryConfig> for BaseInventory {
    fn from(cfg: config::BaseInventoryConfig) -> Self {
        Self::new(cfg.hq, cfg.nq)
    }
}

/// 可用库存（基础库存减去全局未归还数量，可能为负）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub hq: i64,
    pub nq: i64,
}
