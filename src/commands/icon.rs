//! Icons shown next to headings and notifications.

use std::borrow::Cow;

/// Known icon kinds plus a caller-supplied glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icon {
    Customers,
    Orders,
    Suppliers,
    Products,
    Cart,
    User,
    Success,
    Error,
    Custom(String),
}

impl Icon {
    /// Resolves a string tag; unknown tags are used verbatim as the glyph.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "customers" => Icon::Customers,
            "orders" => Icon::Orders,
            "suppliers" => Icon::Suppliers,
            "products" => Icon::Products,
            "cart" => Icon::Cart,
            "user" => Icon::User,
            "success" => Icon::Success,
            "error" => Icon::Error,
            _ => Icon::Custom(tag.trim().to_string()),
        }
    }
}

pub fn glyph(icon: &Icon) -> Cow<'_, str> {
    match icon {
        Icon::Customers => Cow::Borrowed("👥"),
        Icon::Orders => Cow::Borrowed("🧾"),
        Icon::Suppliers => Cow::Borrowed("🚚"),
        Icon::Products => Cow::Borrowed("📦"),
        Icon::Cart => Cow::Borrowed("🛒"),
        Icon::User => Cow::Borrowed("👤"),
        Icon::Success => Cow::Borrowed("✔"),
        Icon::Error => Cow::Borrowed("✖"),
        Icon::Custom(glyph) => Cow::Borrowed(glyph.as_str()),
    }
}
