pub mod cache;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;
pub mod state;

#[cfg(feature = "cli")]
pub mod commands;

/// Role allowed to use the back-office commands.
pub const SERVICE_ADMIN_ROLE: &str = "admin";
