//! domain-core - 跨 context 的领域核心 trait

mod entity;

pub use entity::*;

// Re-export common types
pub use common::AuditInfo;
