use crate::cache::{QueryCache, QueryKey};
use crate::domain::Resource;
use crate::domain::order::{NewOrder, Order};
use crate::domain::types::OrderNote;
use crate::repository::CollectionWriter;
use crate::services::notify::{Notification, Notifier};
use crate::services::{ServiceError, ServiceResult};
use crate::state::cart::CartContext;
use crate::state::session::SessionContext;

/// Places an order for the cart contents on behalf of the signed-in user.
///
/// The cart is cleared only after the backend accepted the order; on failure
/// it is left untouched so the user can retry. Once the order exists the call
/// succeeds even if clearing the stored cart fails; that failure is reported
/// as a separate notification.
pub fn checkout<R, N>(
    repo: &R,
    cart: &CartContext,
    session: &SessionContext,
    cache: &QueryCache,
    notifier: &N,
    notes: Option<OrderNote>,
) -> ServiceResult<Order>
where
    R: CollectionWriter<Order> + ?Sized,
    N: Notifier + ?Sized,
{
    let Some(user) = session.current_user() else {
        return Err(ServiceError::Unauthorized);
    };

    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(ServiceError::Form("The cart is empty".to_string()));
    }

    let new_order = NewOrder {
        customer_id: user.customer_id,
        lines: snapshot.order_lines(),
        notes,
    };

    let order = repo.create(&new_order).map_err(|err| {
        log::error!("Failed to place order for {}: {err}", user.email);
        notifier.notify(Notification::destructive("Checkout failed", &err));
        ServiceError::from(err)
    })?;

    cache.invalidate(&QueryKey::namespace(Order::COLLECTION));
    notifier.notify(Notification::success(
        "Order placed",
        format!("Order #{} with {} items.", order.id, snapshot.item_count()),
    ));
    log::info!("Placed order #{} for {}", order.id, user.email);

    if let Err(err) = cart.clear() {
        log::error!("Order #{} placed but the cart was not cleared: {err}", order.id);
        notifier.notify(Notification::destructive("Cart not cleared", &err));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::cache::CacheLookup;
    use crate::domain::order::OrderStatus;
    use crate::domain::product::Product;
    use crate::domain::types::{CustomerId, OrderId, ProductId, UserId};
    use crate::domain::user::{Session, SessionTokens, SessionUser};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockOrderRepository;
    use crate::services::notify::recording::RecordingNotifier;
    use crate::domain::cart::Cart;
    use crate::services::notify::NotificationKind;
    use crate::state::storage::{
        self, CART_KEY, KeyValueStorage, MemoryStorage, SESSION_KEY, StorageError,
    };

    /// Accepts every write except the cart's.
    struct CartWritesFail(MemoryStorage);

    impl KeyValueStorage for CartWritesFail {
        fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get_raw(key)
        }

        fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == CART_KEY {
                return Err(std::io::Error::other("disk full").into());
            }
            self.0.set_raw(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
    }

    fn signed_in(storage: &Arc<dyn KeyValueStorage>) -> SessionContext {
        let session = Session {
            user: SessionUser {
                id: UserId::new(3).expect("valid id"),
                email: "shopper@example.com".to_string(),
                name: "Shopper".to_string(),
                roles: vec![],
                customer_id: Some(CustomerId::new(8).expect("valid id")),
            },
            tokens: SessionTokens {
                access_token: "token".to_string(),
                refresh_token: None,
            },
        };
        storage::save(storage.as_ref(), SESSION_KEY, &session).expect("seed session");
        SessionContext::hydrate(storage.clone()).expect("hydrate")
    }

    fn product() -> Product {
        Product {
            id: ProductId::new(4).expect("valid id"),
            name: "Kettle".to_string(),
            sku: "KT-1".to_string(),
            price_cents: 2_500,
            stock: 3,
            supplier_id: None,
            category: None,
        }
    }

    fn placed(new: &NewOrder) -> Order {
        Order {
            id: OrderId::new(11).expect("valid id"),
            customer_id: new.customer_id,
            customer_name: None,
            status: OrderStatus::Pending,
            total_cents: 5_000,
            lines: vec![],
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn checkout_posts_cart_and_clears_it() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let session = signed_in(&storage);
        let cart = CartContext::hydrate(storage).expect("cart");
        cart.add(&product(), 2).expect("added");
        let cache = QueryCache::default();
        let orders_key = QueryKey::new(["orders", "list", "page=1"]);
        let claim = cache.begin(&orders_key).expect("claim");
        cache.complete(claim, 0_u32);
        let notifier = RecordingNotifier::default();
        let mut repo = MockOrderRepository::new();
        repo.expect_create()
            .withf(|new| {
                new.customer_id.map(CustomerId::get) == Some(8)
                    && new.lines.len() == 1
                    && new.lines[0].quantity == 2
            })
            .times(1)
            .returning(|new| Ok(placed(new)));

        let order =
            checkout(&repo, &cart, &session, &cache, &notifier, None).expect("order placed");

        assert_eq!(order.id.get(), 11);
        assert!(cart.snapshot().is_empty());
        assert_eq!(cache.lookup::<u32>(&orders_key), CacheLookup::Miss);
        assert_eq!(notifier.seen.borrow().len(), 1);
    }

    #[test]
    fn failed_checkout_keeps_cart() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let session = signed_in(&storage);
        let cart = CartContext::hydrate(storage).expect("cart");
        cart.add(&product(), 1).expect("added");
        let mut repo = MockOrderRepository::new();
        repo.expect_create()
            .returning(|_| Err(RepositoryError::ConnectionError("offline".into())));

        let result = checkout(
            &repo,
            &cart,
            &session,
            &QueryCache::default(),
            &RecordingNotifier::default(),
            None,
        );

        assert!(result.is_err());
        assert_eq!(cart.snapshot().item_count(), 1);
    }

    #[test]
    fn empty_cart_or_anonymous_user_is_refused() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let anonymous = SessionContext::hydrate(storage.clone()).expect("hydrate");
        let cart = CartContext::hydrate(storage.clone()).expect("cart");
        let repo = MockOrderRepository::new();
        let notifier = RecordingNotifier::default();
        let cache = QueryCache::default();

        assert!(matches!(
            checkout(&repo, &cart, &anonymous, &cache, &notifier, None),
            Err(ServiceError::Unauthorized)
        ));

        let session = signed_in(&storage);
        assert!(matches!(
            checkout(&repo, &cart, &session, &cache, &notifier, None),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn placed_order_is_reported_even_if_cart_clear_fails() {
        let inner = MemoryStorage::new();
        let mut seeded = Cart::default();
        seeded.add(&product(), 1).expect("valid quantity");
        storage::save(&inner, CART_KEY, &seeded).expect("seed cart");
        let storage: Arc<dyn KeyValueStorage> = Arc::new(CartWritesFail(inner));
        let session = signed_in(&storage);
        let cart = CartContext::hydrate(storage).expect("cart");
        let cache = QueryCache::default();
        let orders_key = QueryKey::new(["orders", "list", "page=1"]);
        let claim = cache.begin(&orders_key).expect("claim");
        cache.complete(claim, 0_u32);
        let notifier = RecordingNotifier::default();
        let mut repo = MockOrderRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|new| Ok(placed(new)));

        let order =
            checkout(&repo, &cart, &session, &cache, &notifier, None).expect("order placed");

        assert_eq!(order.id.get(), 11);
        assert_eq!(cache.lookup::<u32>(&orders_key), CacheLookup::Miss);
        let kinds: Vec<NotificationKind> =
            notifier.seen.borrow().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::Success, NotificationKind::Destructive]
        );
    }
}
