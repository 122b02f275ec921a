use serde::Deserialize;
use validator::Validate;

use crate::domain::order::{NewOrder, NewOrderLine, Order, OrderStatus, UpdateOrder};
use crate::domain::types::{CustomerId, OrderNote, ProductId};
use crate::forms::{DialogForm, FormError, optional};

#[derive(Clone, Debug, Default, Deserialize, Validate)]
/// Back-office order form. Lines are entered as `product_id:quantity`
/// pairs separated by commas, e.g. `12:2, 15:1`.
pub struct OrderForm {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub lines: String,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub status: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub notes: String,
}

fn parse_line(raw: &str) -> Result<NewOrderLine, FormError> {
    let invalid = || FormError::InvalidValue(format!("invalid order line `{raw}`"));
    let (product, quantity) = raw.split_once(':').ok_or_else(invalid)?;
    let product_id: ProductId = product.trim().parse()?;
    let quantity: u32 = quantity.trim().parse().map_err(|_| invalid())?;
    if quantity == 0 {
        return Err(invalid());
    }
    Ok(NewOrderLine {
        product_id,
        quantity,
    })
}

impl OrderForm {
    fn parsed_lines(&self) -> Result<Vec<NewOrderLine>, FormError> {
        self.lines
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_line)
            .collect()
    }
}

impl DialogForm<Order> for OrderForm {
    fn from_record(record: &Order) -> Self {
        Self {
            customer_id: record
                .customer_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            lines: record
                .lines
                .iter()
                .map(|l| format!("{}:{}", l.product_id, l.quantity))
                .collect::<Vec<_>>()
                .join(", "),
            status: record.status.to_string(),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    fn to_new(&self) -> Result<NewOrder, FormError> {
        let lines = self.parsed_lines()?;
        if lines.is_empty() {
            return Err(FormError::InvalidValue(
                "an order needs at least one line".to_string(),
            ));
        }
        Ok(NewOrder {
            customer_id: optional(&self.customer_id, |raw| raw.parse::<CustomerId>())?,
            lines,
            notes: optional(&self.notes, |v| OrderNote::new(v))?,
        })
    }

    fn to_update(&self) -> Result<UpdateOrder, FormError> {
        let status = self.status.trim();
        Ok(UpdateOrder {
            status: (!status.is_empty()).then(|| OrderStatus::from(status)),
            notes: optional(&self.notes, |v| OrderNote::new(v))?,
        })
    }
}
