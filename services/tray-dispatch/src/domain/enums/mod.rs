//! 枚举定义

mod dispatch_status;
mod return_condition;
mod severity;

pub use dispatch_status::*;
pub use return_condition::*;
pub use severity::*;
