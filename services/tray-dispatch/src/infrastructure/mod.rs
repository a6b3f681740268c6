//! Infrastructure layer

pub mod api;
pub mod persistence;
