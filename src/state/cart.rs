use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use crate::domain::cart::Cart;
use crate::domain::product::Product;
use crate::domain::types::ProductId;
use crate::services::{ServiceError, ServiceResult};
use crate::state::storage::{self, CART_KEY, KeyValueStorage, StorageError};

/// Shopping cart persisted after every mutation. The client is the only
/// owner of cart contents.
pub struct CartContext {
    storage: Arc<dyn KeyValueStorage>,
    cart: RwLock<Cart>,
}

impl CartContext {
    pub fn hydrate(storage: Arc<dyn KeyValueStorage>) -> Result<Self, StorageError> {
        let cart = match storage::load::<Cart>(storage.as_ref(), CART_KEY) {
            Ok(cart) => cart.unwrap_or_default(),
            Err(err @ StorageError::Corrupt { .. }) => {
                log::warn!("Discarding stored cart: {err}");
                storage.remove(CART_KEY)?;
                Cart::default()
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            storage,
            cart: RwLock::new(cart),
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.cart.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Cart {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `change` to a copy of the cart and only keeps it once the copy
    /// has been persisted.
    fn mutate<R>(&self, change: impl FnOnce(&mut Cart) -> R) -> Result<R, StorageError> {
        let mut cart = self.write();
        let mut next = cart.clone();
        let result = change(&mut next);
        storage::save(self.storage.as_ref(), CART_KEY, &next).map_err(|err| {
            log::error!("Failed to persist cart: {err}");
            err
        })?;
        *cart = next;
        Ok(result)
    }

    pub fn add(&self, product: &Product, quantity: u32) -> ServiceResult<()> {
        self.mutate(|cart| cart.add(product, quantity))?
            .map_err(|err| ServiceError::TypeConstraint(err.to_string()))
    }

    /// Returns whether the product was in the cart.
    pub fn set_quantity(&self, product_id: ProductId, quantity: u32) -> ServiceResult<bool> {
        Ok(self.mutate(|cart| cart.set_quantity(product_id, quantity))?)
    }

    pub fn remove(&self, product_id: ProductId) -> ServiceResult<bool> {
        Ok(self.mutate(|cart| cart.remove(product_id))?)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.mutate(Cart::clear)
    }
}
