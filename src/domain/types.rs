//! Validated value objects. Constructing one is the only way a form value
//! reaches a create or update payload.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Page sizes the back-office lists accept.
pub const ALLOWED_PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    #[error("id must be greater than zero")]
    NonPositiveId,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("value cannot be empty")]
    EmptyString,
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("invalid url address")]
    InvalidUrl,
    #[error("page size {0} is not allowed")]
    InvalidPageSize(usize),
}

fn non_empty(value: String) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString)
    } else {
        Ok(trimmed.to_string())
    }
}

macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i32>()
                    .map_err(|_| TypeConstraintError::InvalidValue(s.to_string()))
                    .and_then(Self::new)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(CustomerId, "Unique identifier for a customer.");
id_newtype!(OrderId, "Unique identifier for an order.");
id_newtype!(SupplierId, "Unique identifier for a supplier.");
id_newtype!(ProductId, "Unique identifier for a catalog product.");
id_newtype!(UserId, "Unique identifier for a back-office user.");

/// Shared accessors of the validated string wrappers below. Each wrapper
/// supplies its own `new`.
macro_rules! string_value {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_value!(EmailAddress, "Lower-cased and validated email address.");
string_value!(CustomerName, "Trimmed, non-empty customer name.");
string_value!(SupplierName, "Trimmed, non-empty supplier name.");
string_value!(StreetAddress, "Trimmed, non-empty postal address.");
string_value!(OrderNote, "Free-text order note, HTML-sanitized and trimmed.");
string_value!(PhoneNumber, "Phone number normalized to E.164.");
string_value!(WebsiteUrl, "Validated website address of a supplier.");

impl EmailAddress {
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = email.into().trim().to_lowercase();
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(TypeConstraintError::InvalidEmail)
        }
    }
}

impl CustomerName {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        non_empty(value.into()).map(Self)
    }
}

impl SupplierName {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        non_empty(value.into()).map(Self)
    }
}

impl StreetAddress {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        non_empty(value.into()).map(Self)
    }
}

impl OrderNote {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        non_empty(ammonia::clean(&value.into())).map(Self)
    }
}

impl PhoneNumber {
    /// Parses any international notation and stores the E.164 form.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let raw = non_empty(value.into())?;
        let parsed = parse(None, &raw).map_err(|_| TypeConstraintError::InvalidPhone)?;
        Ok(Self(parsed.format().mode(Mode::E164).to_string()))
    }
}

impl WebsiteUrl {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let url = non_empty(value.into())?;
        if url.validate_url() {
            Ok(Self(url))
        } else {
            Err(TypeConstraintError::InvalidUrl)
        }
    }
}

/// Number of rows requested per list page, restricted to [`ALLOWED_PAGE_SIZES`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub fn new(value: usize) -> Result<Self, TypeConstraintError> {
        if ALLOWED_PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidPageSize(value))
        }
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(20)
    }
}

impl Display for PageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = TypeConstraintError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_reject_non_positive_values() {
        assert_eq!(CustomerId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(OrderId::new(-3), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(SupplierId::new(7).map(SupplierId::get), Ok(7));
    }

    #[test]
    fn ids_parse_from_strings() {
        assert_eq!("42".parse::<ProductId>().map(i32::from), Ok(42));
        assert!(matches!(
            "abc".parse::<CustomerId>(),
            Err(TypeConstraintError::InvalidValue(_))
        ));
        assert_eq!(
            "0".parse::<CustomerId>(),
            Err(TypeConstraintError::NonPositiveId)
        );
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = EmailAddress::new("  Alice@Example.COM ").expect("valid email");
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(
            EmailAddress::new("not-an-email"),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn names_reject_blank_values() {
        assert_eq!(CustomerName::new("   "), Err(TypeConstraintError::EmptyString));
        assert_eq!(
            SupplierName::new(" Acme ").map(String::from),
            Ok("Acme".to_string())
        );
    }

    #[test]
    fn order_note_strips_markup() {
        let note = OrderNote::new("<script>alert(1)</script>Leave at door").expect("valid note");
        assert_eq!(note.as_str(), "Leave at door");
    }

    #[test]
    fn phone_is_normalized_to_e164() {
        let phone = PhoneNumber::new("+1 (415) 555-2671").expect("valid phone");
        assert_eq!(phone.as_str(), "+14155552671");
        assert_eq!(PhoneNumber::new("abc"), Err(TypeConstraintError::InvalidPhone));
    }

    #[test]
    fn website_requires_valid_url() {
        assert!(WebsiteUrl::new("https://acme.example").is_ok());
        assert_eq!(WebsiteUrl::new("acme"), Err(TypeConstraintError::InvalidUrl));
    }

    #[test]
    fn page_size_is_restricted_to_allowed_set() {
        assert_eq!(PageSize::new(50).map(PageSize::get), Ok(50));
        assert_eq!(PageSize::new(7), Err(TypeConstraintError::InvalidPageSize(7)));
        assert_eq!(PageSize::default().get(), 20);
    }
}
