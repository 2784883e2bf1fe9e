//! Core DocChat library (controller, backend client, config).

pub mod backend;
pub mod config;
pub mod core;
pub mod files;
pub mod logging;
