use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{CustomerId, CustomerName, EmailAddress, PhoneNumber, StreetAddress};
use crate::domain::{Editable, Resource};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub orders_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: CustomerName,
    pub email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<StreetAddress>,
}

/// Partial update; absent fields are left untouched by the backend.
/// `Some(None)` on a nullable field is sent as `null` and clears it.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<CustomerName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<PhoneNumber>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<StreetAddress>>,
}

impl Resource for Customer {
    type Id = CustomerId;

    const COLLECTION: &'static str = "customers";
    const LABEL: &'static str = "Customer";

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Editable for Customer {
    type New = NewCustomer;
    type Update = UpdateCustomer;
}
