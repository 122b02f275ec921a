//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use pushkind_backoffice::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use pushkind_backoffice::domain::types::{CustomerId, UserId};
use pushkind_backoffice::domain::user::{Session, SessionTokens, SessionUser};
use pushkind_backoffice::dto::query::{ListQueryParams, SortDirection};
use pushkind_backoffice::pagination::PagedResult;
use pushkind_backoffice::repository::errors::{RepositoryError, RepositoryResult};
use pushkind_backoffice::repository::{CollectionReader, CollectionWriter};
use pushkind_backoffice::services::notify::{Notification, Notifier};
use pushkind_backoffice::state::session::SessionContext;
use pushkind_backoffice::state::storage::{self, KeyValueStorage, SESSION_KEY};

/// Customer backend kept in memory, counting list requests.
#[derive(Default)]
pub struct InMemoryCustomers {
    records: Mutex<Vec<Customer>>,
    list_calls: AtomicUsize,
    fail_lists: AtomicBool,
}

impl InMemoryCustomers {
    pub fn with_customers(count: i32) -> Self {
        let backend = Self::default();
        {
            let mut records = backend.records.lock().expect("lock poisoned");
            for id in 1..=count {
                records.push(customer(id, &format!("Customer {id:03}")));
            }
        }
        backend
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("lock poisoned").len()
    }
}

pub fn customer(id: i32, name: &str) -> Customer {
    Customer {
        id: CustomerId::new(id).expect("valid id"),
        name: name.to_string(),
        email: format!("customer{id}@example.com"),
        phone: None,
        address: None,
        orders_count: 0,
        created_at: Utc::now(),
    }
}

impl CollectionReader<Customer> for InMemoryCustomers {
    fn list(&self, query: &ListQueryParams) -> RepositoryResult<PagedResult<Customer>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionError("backend unavailable".into()));
        }

        let records = self.records.lock().expect("lock poisoned");
        let needle = query.search().map(str::to_lowercase);
        let mut matching: Vec<Customer> = records
            .iter()
            .filter(|c| {
                needle
                    .as_ref()
                    .is_none_or(|n| c.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        if query.sort_direction() == SortDirection::Descending {
            matching.reverse();
        }

        let size = query.page_size().get();
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((query.page() - 1) * size)
            .take(size)
            .collect();
        Ok(PagedResult::new(items, query.page(), size, total))
    }

    fn get_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.iter().find(|c| c.id == id).cloned())
    }
}

impl CollectionWriter<Customer> for InMemoryCustomers {
    fn create(&self, payload: &NewCustomer) -> RepositoryResult<Customer> {
        let mut records = self.records.lock().expect("lock poisoned");
        let next_id = records.iter().map(|c| c.id.get()).max().unwrap_or(0) + 1;
        let mut created = customer(next_id, payload.name.as_str());
        created.email = payload.email.as_str().to_string();
        records.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: CustomerId, payload: &UpdateCustomer) -> RepositoryResult<Customer> {
        let mut records = self.records.lock().expect("lock poisoned");
        let record = records
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &payload.name {
            record.name = name.as_str().to_string();
        }
        if let Some(email) = &payload.email {
            record.email = email.as_str().to_string();
        }
        Ok(record.clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub seen: RefCell<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

pub fn admin_session(access_token: &str, refresh_token: Option<&str>) -> Session {
    Session {
        user: SessionUser {
            id: UserId::new(1).expect("valid id"),
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            roles: vec!["admin".to_string()],
            customer_id: None,
        },
        tokens: SessionTokens {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
        },
    }
}

/// Session context already signed in with the given tokens.
pub fn signed_in(
    storage: Arc<dyn KeyValueStorage>,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Arc<SessionContext> {
    storage::save(
        storage.as_ref(),
        SESSION_KEY,
        &admin_session(access_token, refresh_token),
    )
    .expect("seed session");
    Arc::new(SessionContext::hydrate(storage).expect("hydrate session"))
}
