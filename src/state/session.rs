//! Authenticated session as an explicit context object.
//!
//! The context is hydrated from durable storage once at start-up, passed to
//! whoever needs it, and torn down by [`SessionContext::logout`]. The HTTP
//! repository reads and refreshes credentials through its [`TokenStore`]
//! implementation.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::user::{Credentials, Session, SessionTokens, SessionUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AuthGateway, TokenStore};
use crate::services::{ServiceError, ServiceResult};
use crate::state::storage::{self, KeyValueStorage, SESSION_KEY, StorageError};

pub struct SessionContext {
    storage: Arc<dyn KeyValueStorage>,
    session: RwLock<Option<Session>>,
}

impl SessionContext {
    /// Restores the persisted session, discarding an unreadable record.
    pub fn hydrate(storage: Arc<dyn KeyValueStorage>) -> Result<Self, StorageError> {
        let session = match storage::load::<Session>(storage.as_ref(), SESSION_KEY) {
            Ok(session) => session,
            Err(err @ StorageError::Corrupt { .. }) => {
                log::warn!("Discarding stored session: {err}");
                storage.remove(SESSION_KEY)?;
                None
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            storage,
            session: RwLock::new(session),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Signs in and persists the new session.
    pub fn login<A>(&self, auth: &A, credentials: &Credentials) -> ServiceResult<SessionUser>
    where
        A: AuthGateway + ?Sized,
    {
        let session = auth.login(credentials).map_err(|err| {
            log::error!("Failed to log in {}: {err}", credentials.email);
            ServiceError::from(err)
        })?;
        storage::save(self.storage.as_ref(), SESSION_KEY, &session)?;

        let user = session.user.clone();
        *self.write() = Some(session);
        log::info!("Logged in as {}", user.email);
        Ok(user)
    }

    /// Asks the backend who the stored credentials belong to. An auth failure
    /// ends the session; a transport failure keeps the cached session and is
    /// returned to the caller.
    pub fn revalidate<A>(&self, auth: &A) -> ServiceResult<Option<SessionUser>>
    where
        A: AuthGateway + ?Sized,
    {
        if !self.is_authenticated() {
            return Ok(None);
        }

        match auth.who_am_i() {
            Ok(user) => {
                let snapshot = {
                    let mut guard = self.write();
                    match guard.as_mut() {
                        Some(session) => {
                            session.user = user.clone();
                            Some(session.clone())
                        }
                        None => None,
                    }
                };
                match snapshot {
                    Some(session) => {
                        storage::save(self.storage.as_ref(), SESSION_KEY, &session)?;
                        Ok(Some(user))
                    }
                    None => Ok(None),
                }
            }
            Err(RepositoryError::Unauthorized) => {
                self.logout()?;
                Ok(None)
            }
            Err(err) => {
                log::error!("Failed to revalidate session: {err}");
                Err(err.into())
            }
        }
    }

    /// Clears the session from memory and durable storage.
    pub fn logout(&self) -> Result<(), StorageError> {
        let previous = self.write().take();
        if let Some(session) = previous {
            log::info!("Logged out {}", session.user.email);
        }
        self.storage.remove(SESSION_KEY)
    }
}

impl TokenStore for SessionContext {
    fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.tokens.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.read()
            .as_ref()
            .and_then(|s| s.tokens.refresh_token.clone())
    }

    fn store_tokens(&self, tokens: SessionTokens) -> RepositoryResult<()> {
        let snapshot = {
            let mut guard = self.write();
            match guard.as_mut() {
                Some(session) => {
                    session.tokens = tokens;
                    session.clone()
                }
                None => return Ok(()),
            }
        };
        storage::save(self.storage.as_ref(), SESSION_KEY, &snapshot)
            .map_err(|err| RepositoryError::Storage(err.to_string()))
    }

    fn clear_session(&self) {
        if let Err(err) = self.logout() {
            log::error!("Failed to clear stored session: {err}");
        }
    }
}
