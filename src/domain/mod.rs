//! Domain aggregates exposed by the back-office service layer.
//!
//! The backend owns every entity; the client only ever holds a cached copy.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;
pub mod supplier;
pub mod types;
pub mod user;

/// A backend collection the list pattern can browse.
pub trait Resource: Clone + Debug + DeserializeOwned + Send + Sync + 'static {
    /// Typed identifier of a single record.
    type Id: Copy + Debug + Display + FromStr + PartialEq + Send + Sync + 'static;

    /// Path segment of the collection on the REST API, also used as the
    /// cache namespace.
    const COLLECTION: &'static str;

    /// Human-readable singular name used in notifications.
    const LABEL: &'static str;

    fn id(&self) -> Self::Id;
}

/// A collection that accepts create and update payloads.
pub trait Editable: Resource {
    type New: Serialize + Debug;
    type Update: Serialize + Debug;
}
