//! Commands module

pub mod dispatch_commands;

pub use dispatch_commands::*;
