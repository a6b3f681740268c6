//! 领域层
//!
//! 发运单实体、值对象、枚举、仓储接口，以及对快照做纯计算的领域服务

pub mod entities;
pub mod enums;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use enums::*;
pub use repositories::*;
pub use services::*;
pub use value_objects::*;
