//! 归还数量差异检测

use serde::{Deserialize, Serialize};

use crate::domain::entities::Dispatch;
use crate::domain::value_objects::BoxCounts;

/// 差异详情（仅存在于归还流程中，不持久化）
///
/// `diff = 发出 - 归还`：正数表示少还，负数表示多还。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchDetails {
    pub dispatch: Dispatch,
    pub returned_hq: u32,
    pub returned_nq: u32,
    pub hq_diff: i64,
    pub nq_diff: i64,
}

impl MismatchDetails {
    /// 任一类托盘少还
    pub fn is_short(&self) -> bool {
        self.hq_diff > 0 || self.nq_diff > 0
    }

    /// 任一类托盘多还
    pub fn is_over(&self) -> bool {
        self.hq_diff < 0 || self.nq_diff < 0
    }

    /// 确认提示文案，例如 `HQ: 2 short, NQ: matched`
    pub fn summary(&self) -> String {
        format!(
            "HQ: {}, NQ: {}",
            describe_diff(self.hq_diff),
            describe_diff(self.nq_diff)
        )
    }
}

fn describe_diff(diff: i64) -> String {
    match diff {
        0 => "matched".to_string(),
        d if d > 0 => format!("{} short", d),
        d => format!("{} over", -d),
    }
}

/// 提交归还前的差异检查
///
/// 数量完全一致返回 `None`。这是确认门而不是校验：它从不拒绝归还，也不修改发运单。
pub fn detect_mismatch(dispatch: &Dispatch, returned: BoxCounts) -> Option<MismatchDetails> {
    if returned == dispatch.boxes() {
        return None;
    }
    Some(MismatchDetails {
        dispatch: dispatch.clone(),
        returned_hq: returned.hq,
        returned_nq: returned.nq,
        hq_diff: i64::from(dispatch.hq_boxes()) - i64::from(returned.hq),
        nq_diff: i64::from(dispatch.nq_boxes()) - i64::from(returned.nq),
    })
}
