use serde::{Deserialize, Serialize};

use crate::domain::Resource;
use crate::domain::types::{ProductId, SupplierId};

/// Catalog entry. Read-only from the client's point of view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Resource for Product {
    type Id = ProductId;

    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";

    fn id(&self) -> Self::Id {
        self.id
    }
}
