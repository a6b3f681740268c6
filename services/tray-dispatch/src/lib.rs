//! tray-dispatch - 岩芯托盘发运/归还跟踪

pub mod application;
pub mod domain;
pub mod infrastructure;
