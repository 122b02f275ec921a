//! Form definitions backing the create/edit dialogs and the login prompt.

use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::Editable;
use crate::domain::types::TypeConstraintError;

pub mod customer;
pub mod login;
pub mod order;
pub mod supplier;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid identifier")]
    InvalidId,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid url")]
    InvalidUrl,

    #[error("{0}")]
    InvalidValue(String),

    #[error("{0} cannot be created from this form")]
    CreateUnsupported(&'static str),
}

/// Form edited inside an [`crate::services::dialog::EntityDialog`].
pub trait DialogForm<T: Editable>: Validate + Default + Clone {
    /// Pre-populates the form from a fetched record.
    fn from_record(record: &T) -> Self;

    fn to_new(&self) -> Result<T::New, FormError>;

    fn to_update(&self) -> Result<T::Update, FormError>;
}

/// Builds an optional value object, treating blank input as absent.
pub(crate) fn optional<V>(
    value: &str,
    build: impl FnOnce(&str) -> Result<V, TypeConstraintError>,
) -> Result<Option<V>, TypeConstraintError> {
    let value = value.trim();
    if value.is_empty() {
        Ok(None)
    } else {
        build(value).map(Some)
    }
}
