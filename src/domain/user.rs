//! Authenticated user and credential types shared by the session context and
//! the auth gateway.

use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::types::{CustomerId, EmailAddress, UserId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Customer record the storefront places orders for, when the user has one.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl SessionUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Debug for SessionTokens {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Current authenticated user together with the credentials used for API calls.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user: SessionUser,
    pub tokens: SessionTokens,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: EmailAddress,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
