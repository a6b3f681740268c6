//! 发运单状态

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 发运单状态
///
/// 初始为 `Outstanding`，只能单向迁移到终态 `Returned`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    /// 已发出，未归还
    #[default]
    Outstanding,
    /// 已归还
    Returned,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Outstanding => "outstanding",
            DispatchStatus::Returned => "returned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchStatus::Returned)
    }

    /// 是否允许迁移到 `next`
    pub fn can_transition_to(&self, next: DispatchStatus) -> bool {
        matches!(
            (self, next),
            (DispatchStatus::Outstanding, DispatchStatus::Returned)
        )
    }
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outstanding" => Ok(DispatchStatus::Outstanding),
            "returned" => Ok(DispatchStatus::Returned),
            other => Err(format!("unknown dispatch status: {}", other)),
        }
    }
}
