//! CLI command handlers.

pub mod chat;
pub mod config;
pub mod exec;
pub mod ping;
