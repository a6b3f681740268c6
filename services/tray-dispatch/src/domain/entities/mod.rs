//! 实体

mod dispatch;

pub use dispatch::*;
