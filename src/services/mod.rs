//! Application services sitting between the outer surface and the
//! repositories.

pub mod checkout;
pub mod dialog;
pub mod errors;
pub mod list;
pub mod notify;
pub mod search;

pub use errors::{FallbackView, ServiceError, ServiceResult};
