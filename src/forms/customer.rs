use serde::Deserialize;
use validator::Validate;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerName, EmailAddress, PhoneNumber, StreetAddress};
use crate::forms::{DialogForm, FormError, optional};

#[derive(Clone, Debug, Default, Deserialize, Validate)]
/// Form data for creating or editing a customer.
pub struct CustomerForm {
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Contact email address.
    #[validate(email)]
    pub email: String,
    /// Contact phone number, blank when unknown.
    #[serde(default)]
    pub phone: String,
    /// Mailing address, blank when unknown.
    #[serde(default)]
    pub address: String,
}

impl DialogForm<Customer> for CustomerForm {
    fn from_record(record: &Customer) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone().unwrap_or_default(),
            address: record.address.clone().unwrap_or_default(),
        }
    }

    fn to_new(&self) -> Result<NewCustomer, FormError> {
        Ok(NewCustomer {
            name: CustomerName::new(self.name.as_str())?,
            email: EmailAddress::new(self.email.as_str())?,
            phone: optional(&self.phone, |v| PhoneNumber::new(v))?,
            address: optional(&self.address, |v| StreetAddress::new(v))?,
        })
    }

    /// Blank optional fields are sent as explicit nulls so an edit can clear them.
    fn to_update(&self) -> Result<UpdateCustomer, FormError> {
        let new = self.to_new()?;
        Ok(UpdateCustomer {
            name: Some(new.name),
            email: Some(new.email),
            phone: Some(new.phone),
            address: Some(new.address),
        })
    }
}
