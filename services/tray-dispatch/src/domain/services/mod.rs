//! 领域服务
//!
//! 全部是对发运单快照的纯函数：无副作用、无隐藏状态，可以在任意时刻重复调用。

mod analytics;
mod inventory;
mod mismatch;
mod overdue;
mod reconciliation;

pub use analytics::*;
pub use inventory::*;
pub use mismatch::*;
pub use overdue::*;
pub use reconciliation::*;
