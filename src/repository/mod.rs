//! Remote collection client: the traits services depend on and the HTTP
//! implementation talking to the REST backend.

use crate::domain::user::{Credentials, Session, SessionTokens, SessionUser};
use crate::domain::{Editable, Resource};
use crate::dto::query::ListQueryParams;
use crate::pagination::PagedResult;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use http::HttpRepository;

pub trait CollectionReader<T: Resource> {
    fn list(&self, query: &ListQueryParams) -> RepositoryResult<PagedResult<T>>;
    fn get_by_id(&self, id: T::Id) -> RepositoryResult<Option<T>>;
}

pub trait CollectionWriter<T: Editable> {
    fn create(&self, payload: &T::New) -> RepositoryResult<T>;
    fn update(&self, id: T::Id, payload: &T::Update) -> RepositoryResult<T>;
}

pub trait AuthGateway {
    fn login(&self, credentials: &Credentials) -> RepositoryResult<Session>;
    fn refresh(&self, refresh_token: &str) -> RepositoryResult<SessionTokens>;
    /// Re-validates the stored credentials and returns the user they belong to.
    fn who_am_i(&self) -> RepositoryResult<SessionUser>;
}

/// Where the HTTP client reads and refreshes bearer credentials.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn store_tokens(&self, tokens: SessionTokens) -> RepositoryResult<()>;
    /// Forgets the credentials after an unrecoverable auth failure.
    fn clear_session(&self);
}
