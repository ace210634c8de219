//! Command implementations

pub mod catalog;
pub mod completions;
pub mod config;
pub mod family;
pub mod quote;
