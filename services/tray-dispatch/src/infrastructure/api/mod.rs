//! 远端 CRUD API 适配器
//!
//! 传输层字段使用 snake_case（`hq_boxes`），在此一一映射到领域类型；
//! 项目、钻孔和公司在远端以整数 ID 引用，经 `directory` 与展示名称互转。

mod client;
pub mod converters;
pub mod directory;
pub mod rows;

pub use client::HttpDispatchRepository;
