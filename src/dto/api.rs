//! Wire shapes exchanged with the remote REST API.

use serde::{Deserialize, Serialize};

use crate::domain::user::{Session, SessionTokens, SessionUser};
use crate::pagination::PagedResult;

/// Paginated list envelope returned by collection endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Ignored in favour of a value derived from `total_items`.
    #[serde(default)]
    pub total_pages: Option<usize>,
}

impl<T> PageEnvelope<T> {
    pub fn into_paged(self) -> PagedResult<T> {
        if let Some(reported) = self.total_pages {
            let derived = PagedResult::<T>::pages_for(self.total_items, self.page_size);
            if reported != derived {
                log::warn!("Backend reported {reported} pages, using derived value {derived}");
            }
        }
        PagedResult::new(self.items, self.page, self.page_size, self.total_items)
    }
}

/// Error body returned by the API on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: SessionUser,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session {
            user: response.user,
            tokens: SessionTokens {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}
