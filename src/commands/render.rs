//! Plain-text and CSV rendering of records for the terminal.

use crate::commands::icon::{Icon, glyph};
use crate::domain::cart::{Cart, CartLine};
use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::supplier::Supplier;
use crate::pagination::PaginationView;

/// A record shown as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    fn icon() -> Icon;

    /// Header/value pairs for a detail view.
    fn details(&self) -> Vec<(&'static str, String)> {
        Self::HEADERS.iter().copied().zip(self.cells()).collect()
    }
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl TableRow for Customer {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Email", "Phone", "Orders", "Since"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            optional(&self.phone),
            self.orders_count.to_string(),
            self.created_at.format("%Y-%m-%d").to_string(),
        ]
    }

    fn icon() -> Icon {
        Icon::Customers
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details: Vec<_> = Self::HEADERS.iter().copied().zip(self.cells()).collect();
        details.insert(4, ("Address", optional(&self.address)));
        details
    }
}

impl TableRow for Order {
    const HEADERS: &'static [&'static str] = &["ID", "Customer", "Status", "Total", "Created"];

    fn cells(&self) -> Vec<String> {
        let customer = match (&self.customer_name, self.customer_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => String::new(),
        };
        vec![
            self.id.to_string(),
            customer,
            self.status.to_string(),
            format_cents(self.total_cents),
            self.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    fn icon() -> Icon {
        Icon::Orders
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details: Vec<_> = Self::HEADERS.iter().copied().zip(self.cells()).collect();
        for line in &self.lines {
            details.push((
                "Line",
                format!(
                    "{} x{} @ {}",
                    line.name,
                    line.quantity,
                    format_cents(line.unit_price_cents)
                ),
            ));
        }
        details.push(("Notes", optional(&self.notes)));
        details
    }
}

impl TableRow for Supplier {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Email", "Phone", "Website", "Active"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            optional(&self.contact_email),
            optional(&self.phone),
            optional(&self.website),
            if self.active { "yes" } else { "no" }.to_string(),
        ]
    }

    fn icon() -> Icon {
        Icon::Suppliers
    }
}

impl TableRow for Product {
    const HEADERS: &'static [&'static str] = &["ID", "SKU", "Name", "Price", "Stock", "Category"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sku.clone(),
            self.name.clone(),
            format_cents(self.price_cents),
            self.stock.to_string(),
            optional(&self.category),
        ]
    }

    fn icon() -> Icon {
        Icon::Products
    }
}

impl TableRow for CartLine {
    const HEADERS: &'static [&'static str] = &["Product", "Name", "Qty", "Price", "Subtotal"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.product_id.to_string(),
            self.name.clone(),
            self.quantity.to_string(),
            format_cents(self.unit_price_cents),
            format_cents(self.subtotal_cents()),
        ]
    }

    fn icon() -> Icon {
        Icon::Cart
    }
}

pub fn heading<T: TableRow>(title: &str) -> String {
    format!("{} {title}", glyph(&T::icon()))
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Left-aligned columns padded to the widest cell.
pub fn render_table<T: TableRow>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "No records found.".to_string();
    }

    let rows: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(T::HEADERS.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(format_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

pub fn render_details<T: TableRow>(record: &T) -> String {
    let width = T::HEADERS
        .iter()
        .map(|h| h.chars().count())
        .max()
        .unwrap_or(0)
        .max("Address".len());
    record
        .details()
        .into_iter()
        .map(|(label, value)| format!("{label:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_csv<T: TableRow>(rows: &[T]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// One-line pager, e.g. `« ‹ 1 2 [3] 4 5 … › »  3 / 20  (41-60 of 400)`.
pub fn render_pagination(view: &PaginationView, total_items: usize) -> String {
    let control = |label: &str, enabled: bool| {
        if enabled {
            label.to_string()
        } else {
            " ".repeat(label.chars().count())
        }
    };

    let pages = view
        .pages
        .iter()
        .map(|page| match page {
            Some(page) if *page == view.current => format!("[{page}]"),
            Some(page) => page.to_string(),
            None => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut line = [
        control("«", view.first.enabled),
        control("‹", view.prev.enabled),
        pages,
        control("›", view.next.enabled),
        control("»", view.last.enabled),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    line.push_str("  ");
    line.push_str(&view.summary);
    if let Some((first, last)) = view.item_range {
        line.push_str(&format!("  ({first}-{last} of {total_items})"));
    }
    line
}

pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return format!("{} The cart is empty.", glyph(&Icon::Cart));
    }
    format!(
        "{}\n{}\nItems: {}  Total: {}",
        heading::<CartLine>("Cart"),
        render_table(cart.lines()),
        cart.item_count(),
        format_cents(cart.total_cents())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SupplierId;
    use crate::pagination::{COMPACT_WINDOW, pagination_view};

    fn supplier(id: i32, name: &str) -> Supplier {
        Supplier {
            id: SupplierId::new(id).expect("valid id"),
            name: name.to_string(),
            contact_email: None,
            phone: None,
            website: None,
            active: id % 2 == 1,
        }
    }

    #[test]
    fn cents_are_formatted_with_two_decimals() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(1_205), "12.05");
        assert_eq!(format_cents(-50), "-0.50");
    }

    #[test]
    fn table_columns_are_aligned() {
        let table = render_table(&[supplier(1, "Acme"), supplier(22, "Globex Corporation")]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  Name"));
        assert!(lines[2].starts_with("1   Acme"));
        assert!(lines[3].contains("Globex Corporation"));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = render_csv(&[supplier(1, "Acme, Inc.")]).expect("csv");

        assert_eq!(
            csv,
            "ID,Name,Email,Phone,Website,Active\n1,\"Acme, Inc.\",,,,yes\n"
        );
    }

    #[test]
    fn pager_marks_current_page_and_hides_disabled_controls() {
        let view = pagination_view(1, 20, 400, 20, COMPACT_WINDOW);

        let line = render_pagination(&view, 400);

        assert!(line.contains("[1] 2 3 4 5 … › »"));
        assert!(line.ends_with("1 / 20  (1-20 of 400)"));
    }

    #[test]
    fn empty_pager_shows_zero_summary() {
        let view = pagination_view(1, 1, 0, 20, COMPACT_WINDOW);

        assert!(render_pagination(&view, 0).ends_with("0 / 0"));
    }
}
