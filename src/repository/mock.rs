//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::order::{NewOrder, Order, UpdateOrder};
use crate::domain::supplier::{NewSupplier, Supplier, UpdateSupplier};
use crate::domain::types::{CustomerId, OrderId, SupplierId};
use crate::domain::user::{Credentials, Session, SessionTokens, SessionUser};
use crate::dto::query::ListQueryParams;
use crate::pagination::PagedResult;
use crate::repository::errors::RepositoryResult;
use crate::repository::{AuthGateway, CollectionReader, CollectionWriter};

mock! {
    pub CustomerRepository {}

    impl CollectionReader<Customer> for CustomerRepository {
        fn list(&self, query: &ListQueryParams) -> RepositoryResult<PagedResult<Customer>>;
        fn get_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>>;
    }

    impl CollectionWriter<Customer> for CustomerRepository {
        fn create(&self, payload: &NewCustomer) -> RepositoryResult<Customer>;
        fn update(&self, id: CustomerId, payload: &UpdateCustomer) -> RepositoryResult<Customer>;
    }
}

mock! {
    pub OrderRepository {}

    impl CollectionReader<Order> for OrderRepository {
        fn list(&self, query: &ListQueryParams) -> RepositoryResult<PagedResult<Order>>;
        fn get_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>>;
    }

    impl CollectionWriter<Order> for OrderRepository {
        fn create(&self, payload: &NewOrder) -> RepositoryResult<Order>;
        fn update(&self, id: OrderId, payload: &UpdateOrder) -> RepositoryResult<Order>;
    }
}

mock! {
    pub SupplierRepository {}

    impl CollectionReader<Supplier> for SupplierRepository {
        fn list(&self, query: &ListQueryParams) -> RepositoryResult<PagedResult<Supplier>>;
        fn get_by_id(&self, id: SupplierId) -> RepositoryResult<Option<Supplier>>;
    }

    impl CollectionWriter<Supplier> for SupplierRepository {
        fn create(&self, payload: &NewSupplier) -> RepositoryResult<Supplier>;
        fn update(&self, id: SupplierId, payload: &UpdateSupplier) -> RepositoryResult<Supplier>;
    }
}

mock! {
    pub Auth {}

    impl AuthGateway for Auth {
        fn login(&self, credentials: &Credentials) -> RepositoryResult<Session>;
        fn refresh(&self, refresh_token: &str) -> RepositoryResult<SessionTokens>;
        fn who_am_i(&self) -> RepositoryResult<SessionUser>;
    }
}
