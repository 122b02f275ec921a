use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{CustomerId, OrderId, OrderNote, ProductId};
use crate::domain::{Editable, Resource};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub total_cents: i64,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

/// Status reported by the backend. The client displays and forwards it but
/// never drives transitions itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    Other(String),
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Refunded => write!(f, "refunded"),
            OrderStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            "refunded" => OrderStatus::Refunded,
            _ => OrderStatus::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub lines: Vec<NewOrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<OrderNote>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<OrderNote>,
}

impl Resource for Order {
    type Id = OrderId;

    const COLLECTION: &'static str = "orders";
    const LABEL: &'static str = "Order";

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Editable for Order {
    type New = NewOrder;
    type Update = UpdateOrder;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_known_and_unknown_values() {
        assert_eq!(OrderStatus::from("Shipped"), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from("canceled"), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::from("on-hold"),
            OrderStatus::Other("on-hold".to_string())
        );
        assert_eq!(String::from(OrderStatus::Other("on-hold".into())), "on-hold");
    }

    #[test]
    fn order_deserializes_from_camel_case_payload() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 9,
            "customerId": 3,
            "status": "processing",
            "totalCents": 2599,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .expect("valid order payload");

        assert_eq!(order.id, OrderId::new(9).expect("valid id"));
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.lines.is_empty());
    }
}
