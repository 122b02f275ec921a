//! Shopping cart kept entirely on the client.

use serde::{Deserialize, Serialize};

use crate::domain::order::NewOrderLine;
use crate::domain::product::Product;
use crate::domain::types::{ProductId, TypeConstraintError};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(i64::from(self.quantity))
    }
}

/// Ordered cart lines, at most one per product.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), TypeConstraintError> {
        if quantity == 0 {
            return Err(TypeConstraintError::InvalidValue(
                "quantity must be greater than zero".to_string(),
            ));
        }

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.unit_price_cents = product.price_cents;
                line.name.clone_from(&product.name);
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price_cents: product.price_cents,
                quantity,
            }),
        }
        Ok(())
    }

    /// Sets the quantity of an existing line; zero removes it. Returns whether
    /// the product was in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, l| count.saturating_add(l.quantity))
    }

    pub fn total_cents(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |total, l| total.saturating_add(l.subtotal_cents()))
    }

    pub fn order_lines(&self) -> Vec<NewOrderLine> {
        self.lines
            .iter()
            .map(|l| NewOrderLine {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect()
    }
}
