//! Data transfer objects: list query parameters and API wire shapes.

pub mod api;
pub mod query;
