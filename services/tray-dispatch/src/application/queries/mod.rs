//! Queries module

pub mod dispatch_queries;

pub use dispatch_queries::*;
