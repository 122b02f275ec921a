use serde::Deserialize;
use validator::Validate;

use crate::domain::supplier::{NewSupplier, Supplier, UpdateSupplier};
use crate::domain::types::{EmailAddress, PhoneNumber, SupplierName, WebsiteUrl};
use crate::forms::{DialogForm, FormError, optional};

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct SupplierForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Default for SupplierForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            contact_email: String::new(),
            phone: String::new(),
            website: String::new(),
            active: true,
        }
    }
}

impl DialogForm<Supplier> for SupplierForm {
    fn from_record(record: &Supplier) -> Self {
        Self {
            name: record.name.clone(),
            contact_email: record.contact_email.clone().unwrap_or_default(),
            phone: record.phone.clone().unwrap_or_default(),
            website: record.website.clone().unwrap_or_default(),
            active: record.active,
        }
    }

    fn to_new(&self) -> Result<NewSupplier, FormError> {
        Ok(NewSupplier {
            name: SupplierName::new(self.name.as_str())?,
            contact_email: optional(&self.contact_email, |v| EmailAddress::new(v))?,
            phone: optional(&self.phone, |v| PhoneNumber::new(v))?,
            website: optional(&self.website, |v| WebsiteUrl::new(v))?,
            active: self.active,
        })
    }

    fn to_update(&self) -> Result<UpdateSupplier, FormError> {
        let new = self.to_new()?;
        Ok(UpdateSupplier {
            name: Some(new.name),
            contact_email: Some(new.contact_email),
            phone: Some(new.phone),
            website: Some(new.website),
            active: Some(new.active),
        })
    }
}
