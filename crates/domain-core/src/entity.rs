//! 实体基础 trait

use common::AuditInfo;

/// 实体 trait
pub trait Entity {
    type Id;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
    fn audit_info_mut(&mut self) -> &mut AuditInfo;

    /// 记录一次修改
    fn touch(&mut self) {
        self.audit_info_mut().update();
    }
}

/// 单向生命周期
///
/// 状态只能前进；进入终态后不再允许任何迁移。
pub trait Lifecycle {
    type State: Copy + Eq + std::fmt::Debug;

    fn state(&self) -> Self::State;

    fn is_terminal(&self) -> bool;

    /// 是否允许从当前状态迁移到 `next`
    fn can_transition_to(&self, next: Self::State) -> bool;
}
