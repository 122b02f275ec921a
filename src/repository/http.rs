use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::domain::user::{Credentials, Session, SessionTokens, SessionUser};
use crate::domain::{Editable, Resource};
use crate::dto::api::{ApiErrorBody, LoginResponse, PageEnvelope, RefreshRequest};
use crate::dto::query::ListQueryParams;
use crate::pagination::PagedResult;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AuthGateway, CollectionReader, CollectionWriter, TokenStore};

/// REST implementation of the collection and auth traits.
///
/// Every call carries the current bearer token. A `401` triggers exactly one
/// refresh attempt followed by one retry of the original request; if either
/// fails the session is cleared and [`RepositoryError::Unauthorized`] is
/// returned.
#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpRepository {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> RepositoryResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send_with_token<F>(&self, build: &F, token: Option<String>) -> RepositoryResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut request = build(&self.client);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send()?)
    }

    fn end_session(&self, reason: &str) -> RepositoryError {
        log::warn!("{reason}, ending session");
        self.tokens.clear_session();
        RepositoryError::Unauthorized
    }

    fn send_authorized<F>(&self, build: F) -> RepositoryResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = self.send_with_token(&build, self.tokens.access_token())?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Err(self.end_session("Request rejected without a refresh token"));
        };

        let tokens = match self.refresh(&refresh_token) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::error!("Failed to refresh credentials: {err}");
                return Err(self.end_session("Credential refresh failed"));
            }
        };
        let access_token = tokens.access_token.clone();
        self.tokens.store_tokens(tokens)?;

        let retried = self.send_with_token(&build, Some(access_token))?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            return Err(self.end_session("Request rejected after credential refresh"));
        }
        Ok(retried)
    }

    fn read_json<T: DeserializeOwned>(response: Response) -> RepositoryResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .map_err(|err| RepositoryError::Decode(err.to_string()));
        }
        let message = response
            .json::<ApiErrorBody>()
            .ok()
            .and_then(|body| body.message);
        Err(RepositoryError::from_status(status, message))
    }
}

impl<T: Resource> CollectionReader<T> for HttpRepository {
    fn list(&self, query: &ListQueryParams) -> RepositoryResult<PagedResult<T>> {
        let url = self.url(T::COLLECTION);
        let pairs = query.query_pairs();
        let response = self.send_authorized(|client| client.get(&url).query(&pairs))?;
        let envelope: PageEnvelope<T> = Self::read_json(response)?;
        Ok(envelope.into_paged())
    }

    fn get_by_id(&self, id: T::Id) -> RepositoryResult<Option<T>> {
        let url = self.url(&format!("{}/{id}", T::COLLECTION));
        let response = self.send_authorized(|client| client.get(&url))?;
        match Self::read_json(response) {
            Ok(record) => Ok(Some(record)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<T: Editable> CollectionWriter<T> for HttpRepository {
    fn create(&self, payload: &T::New) -> RepositoryResult<T> {
        let url = self.url(T::COLLECTION);
        let response = self.send_authorized(|client| client.post(&url).json(payload))?;
        Self::read_json(response)
    }

    fn update(&self, id: T::Id, payload: &T::Update) -> RepositoryResult<T> {
        let url = self.url(&format!("{}/{id}", T::COLLECTION));
        let response = self.send_authorized(|client| client.patch(&url).json(payload))?;
        Self::read_json(response)
    }
}

impl AuthGateway for HttpRepository {
    fn login(&self, credentials: &Credentials) -> RepositoryResult<Session> {
        let response = self
            .client
            .post(self.url("auth/login"))
            .json(credentials)
            .send()?;
        let login: LoginResponse = Self::read_json(response)?;
        Ok(login.into())
    }

    fn refresh(&self, refresh_token: &str) -> RepositoryResult<SessionTokens> {
        let response = self
            .client
            .post(self.url("auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()?;
        let mut tokens: SessionTokens = Self::read_json(response)?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_string());
        }
        Ok(tokens)
    }

    fn who_am_i(&self) -> RepositoryResult<SessionUser> {
        let url = self.url("auth/me");
        let response = self.send_authorized(|client| client.get(&url))?;
        Self::read_json(response)
    }
}
