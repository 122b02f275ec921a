//! Client-side state contexts hydrated from durable storage.

pub mod cart;
pub mod session;
pub mod storage;
