use serde::Deserialize;
use validator::Validate;

use crate::domain::types::EmailAddress;
use crate::domain::user::Credentials;
use crate::forms::FormError;

#[derive(Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginForm {
    pub fn to_credentials(&self) -> Result<Credentials, FormError> {
        self.validate()?;
        Ok(Credentials {
            email: EmailAddress::new(self.email.as_str())?,
            password: self.password.clone(),
        })
    }
}
