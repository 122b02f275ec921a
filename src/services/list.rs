//! List state controller shared by every entity screen.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey};
use crate::domain::Resource;
use crate::dto::query::{FilterPatch, ListQueryParams};
use crate::pagination::{PagedResult, PaginationView, pagination_view};
use crate::repository::CollectionReader;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::services::{ServiceError, ServiceResult};

/// Claim on one fetch of a list page. Only the most recently issued ticket
/// may update the controller.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    key: QueryKey,
    params: ListQueryParams,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn params(&self) -> &ListQueryParams {
        &self.params
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued after this one; the result was dropped.
    Discarded,
}

/// Current parameters, items and loading state of one entity list.
pub struct ListController<T: Resource> {
    cache: Arc<QueryCache>,
    params: ListQueryParams,
    items: Vec<T>,
    loading: bool,
    total_items: usize,
    total_pages: usize,
    error: Option<String>,
    issued: u64,
}

impl<T: Resource> ListController<T> {
    pub fn new(cache: Arc<QueryCache>, params: ListQueryParams) -> Self {
        Self {
            cache,
            params,
            items: Vec::new(),
            loading: false,
            total_items: 0,
            total_pages: 1,
            error: None,
            issued: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn params(&self) -> &ListQueryParams {
        &self.params
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Merges `patch` into the parameters without fetching.
    pub fn apply_filters(&mut self, patch: FilterPatch) -> bool {
        self.params.apply(patch)
    }

    pub fn update_filters<R>(&mut self, repo: &R, patch: FilterPatch) -> ServiceResult<()>
    where
        R: CollectionReader<T> + ?Sized,
    {
        if self.apply_filters(patch) {
            log::debug!("{} list params changed to {}", T::LABEL, self.params.serialized());
        }
        self.load(repo)
    }

    /// Jumps to page `page`, clamped to the known page range.
    pub fn go_to_page<R>(&mut self, repo: &R, page: usize) -> ServiceResult<()>
    where
        R: CollectionReader<T> + ?Sized,
    {
        let page = page.clamp(1, self.total_pages.max(1));
        self.update_filters(repo, FilterPatch::new().page(page))
    }

    /// Shows the page for the current parameters, from the cache when possible.
    pub fn load<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: CollectionReader<T> + ?Sized,
    {
        let ticket = self.begin_fetch();
        let result = self
            .cache
            .fetch_with(&ticket.key, || repo.list(&ticket.params));
        self.finish_fetch(ticket, result).map(|_| ())
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket {
            seq: self.issued,
            key: QueryKey::list(T::COLLECTION, &self.params),
            params: self.params.clone(),
        }
    }

    /// Applies the result of `ticket` unless a newer fetch has been issued.
    ///
    /// A failed fetch clears the items and records the error, which is also
    /// returned so the caller can notify the user.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: RepositoryResult<PagedResult<T>>,
    ) -> ServiceResult<FetchOutcome> {
        if ticket.seq != self.issued {
            log::debug!(
                "Discarding stale {} response #{} (latest #{})",
                T::LABEL,
                ticket.seq,
                self.issued
            );
            return Ok(FetchOutcome::Discarded);
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.items = page.items;
                self.total_items = page.total_items;
                self.total_pages = page.total_pages;
                self.error = None;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                log::error!("Failed to load {} list {}: {err}", T::LABEL, ticket.key);
                self.items.clear();
                self.total_items = 0;
                self.total_pages = 1;
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Drops every cached page and record of this entity.
    pub fn invalidate(&self) -> usize {
        self.cache.invalidate(&QueryKey::namespace(T::COLLECTION))
    }

    pub fn refresh_after_mutation<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: CollectionReader<T> + ?Sized,
    {
        self.invalidate();
        self.load(repo)
    }

    pub fn pagination(&self, window: usize) -> PaginationView {
        pagination_view(
            self.params.page(),
            self.total_pages,
            self.total_items,
            self.params.page_size().get(),
            window,
        )
    }
}

/// Loads one record through the shared cache.
pub fn fetch_detail<T, R>(repo: &R, cache: &QueryCache, id: T::Id) -> ServiceResult<T>
where
    T: Resource,
    R: CollectionReader<T> + ?Sized,
{
    let key = QueryKey::detail(T::COLLECTION, id);
    cache
        .fetch_with(&key, || {
            repo.get_by_id(id)
                .and_then(|record| record.ok_or(RepositoryError::NotFound))
        })
        .map_err(|err| {
            if !matches!(err, RepositoryError::NotFound) {
                log::error!("Failed to load {} #{id}: {err}", T::LABEL);
            }
            ServiceError::from(err)
        })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::cache::CacheLookup;
    use crate::domain::customer::Customer;
    use crate::domain::types::CustomerId;
    use crate::dto::query::SortDirection;
    use crate::pagination::COMPACT_WINDOW;
    use crate::repository::mock::MockCustomerRepository;

    fn customer(id: i32) -> Customer {
        Customer {
            id: CustomerId::new(id).expect("valid id"),
            name: format!("Customer {id}"),
            email: format!("c{id}@example.com"),
            phone: None,
            address: None,
            orders_count: 0,
            created_at: Utc::now(),
        }
    }

    fn page_of(ids: &[i32], page: usize, total: usize) -> PagedResult<Customer> {
        PagedResult::new(ids.iter().map(|&id| customer(id)).collect(), page, 20, total)
    }

    fn controller() -> ListController<Customer> {
        ListController::new(
            Arc::new(QueryCache::default()),
            ListQueryParams::new("name", SortDirection::Ascending),
        )
    }

    #[test]
    fn second_load_of_same_params_is_served_from_cache() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(page_of(&[1, 2], 1, 2)));
        let mut list = controller();

        list.load(&repo).expect("first load");
        list.load(&repo).expect("second load");

        assert_eq!(list.items().len(), 2);
        assert!(!list.is_loading());
    }

    #[test]
    fn failed_fetch_leaves_empty_idle_state() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_list()
            .returning(|_| Err(RepositoryError::ConnectionError("refused".into())));
        let mut list = controller();

        let result = list.load(&repo);

        assert!(result.is_err());
        assert!(!list.is_loading());
        assert!(list.items().is_empty());
        assert!(list.error().is_some());
    }

    #[test]
    fn stale_response_never_overwrites_newer_state() {
        let mut list = controller();
        let older = list.begin_fetch();
        list.apply_filters(FilterPatch::new().search("bob"));
        let newer = list.begin_fetch();

        let applied = list
            .finish_fetch(newer, Ok(page_of(&[7], 1, 1)))
            .expect("applied");
        let discarded = list
            .finish_fetch(older, Ok(page_of(&[1, 2, 3], 1, 3)))
            .expect("discarded");

        assert_eq!(applied, FetchOutcome::Applied);
        assert_eq!(discarded, FetchOutcome::Discarded);
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].id.get(), 7);
    }

    #[test]
    fn search_change_resets_page_and_refetches() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_list().returning(|params| {
            let page = params.page();
            Ok(page_of(&[page as i32], page, 60))
        });
        let mut list = controller();
        list.load(&repo).expect("load");
        list.go_to_page(&repo, 2).expect("page 2");
        assert_eq!(list.params().page(), 2);

        list.update_filters(&repo, FilterPatch::new().search("ann"))
            .expect("search");

        assert_eq!(list.params().page(), 1);
        assert_eq!(list.params().search(), Some("ann"));
    }

    #[test]
    fn go_to_page_is_clamped() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_list().returning(|params| {
            let page = params.page();
            Ok(page_of(&[1], page, 45))
        });
        let mut list = controller();
        list.load(&repo).expect("load");
        assert_eq!(list.total_pages(), 3);

        list.go_to_page(&repo, 99).expect("clamped");
        assert_eq!(list.params().page(), 3);

        list.go_to_page(&repo, 0).expect("clamped");
        assert_eq!(list.params().page(), 1);
    }

    #[test]
    fn refresh_after_mutation_refetches_current_page() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_list()
            .times(2)
            .returning(|_| Ok(page_of(&[1], 1, 1)));
        let mut list = controller();

        list.load(&repo).expect("load");
        list.refresh_after_mutation(&repo).expect("refresh");
    }

    #[test]
    fn invalidation_keeps_other_namespaces() {
        let list = controller();
        let cache = list.cache().clone();
        let orders = QueryKey::new(["orders", "list", "page=1"]);
        let claim = cache.begin(&orders).expect("claim");
        cache.complete(claim, 1_u32);

        list.invalidate();

        assert_eq!(cache.lookup::<u32>(&orders), CacheLookup::Fresh(1));
    }

    #[test]
    fn detail_fetch_maps_missing_record_to_not_found() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_get_by_id().times(1).returning(|_| Ok(None));
        let cache = QueryCache::default();

        let result =
            fetch_detail::<Customer, _>(&repo, &cache, CustomerId::new(5).expect("valid id"));

        assert!(matches!(result, Err(ServiceError::NotFound)));
        assert!(cache.is_empty());
    }

    #[test]
    fn pagination_reflects_loaded_totals() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_list()
            .returning(|_| Ok(page_of(&[1, 2], 1, 400)));
        let mut list = controller();
        list.load(&repo).expect("load");

        let view = list.pagination(COMPACT_WINDOW);

        assert_eq!(view.total_pages, 20);
        assert_eq!(view.pages.first(), Some(&Some(1)));
        assert_eq!(view.pages.last(), Some(&None));
        assert!(view.last.enabled);
    }
}
