//! 值对象

mod box_counts;
mod ids;
mod scope;

pub use box_counts::*;
pub use ids::*;
pub use scope::*;
