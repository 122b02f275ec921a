use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, PhoneNumber, SupplierId, SupplierName, WebsiteUrl};
use crate::domain::{Editable, Resource};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: SupplierName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<EmailAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<WebsiteUrl>,
    pub active: bool,
}

/// Partial update. `Some(None)` on a nullable field clears it.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<SupplierName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Option<EmailAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<PhoneNumber>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<Option<WebsiteUrl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Supplier {
    type Id = SupplierId;

    const COLLECTION: &'static str = "suppliers";
    const LABEL: &'static str = "Supplier";

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Editable for Supplier {
    type New = NewSupplier;
    type Update = UpdateSupplier;
}
