//! 仓储接口

mod dispatch_repository;

pub use dispatch_repository::*;
