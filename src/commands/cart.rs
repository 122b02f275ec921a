use crate::commands::icon::{Icon, glyph};
use crate::commands::render::{format_cents, render_cart};
use crate::commands::{AppContext, CartAction, CommandResult};
use crate::domain::product::Product;
use crate::domain::types::{OrderNote, ProductId};
use crate::services::ServiceError;
use crate::services::checkout::checkout;
use crate::services::list::fetch_detail;

pub fn run(ctx: &AppContext, action: CartAction) -> CommandResult<()> {
    match action {
        CartAction::Show => {}
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let product = fetch_detail::<Product, _>(&ctx.repo, &ctx.cache, product_id)?;
            ctx.cart.add(&product, quantity)?;
        }
        CartAction::Set {
            product_id,
            quantity,
        } => {
            if !ctx.cart.set_quantity(product_id, quantity)? {
                return Err(not_in_cart(product_id).into());
            }
        }
        CartAction::Remove { product_id } => {
            if !ctx.cart.remove(product_id)? {
                return Err(not_in_cart(product_id).into());
            }
        }
        CartAction::Clear => ctx.cart.clear()?,
        CartAction::Checkout { notes } => {
            let notes = notes
                .filter(|n| !n.trim().is_empty())
                .map(OrderNote::new)
                .transpose()
                .map_err(ServiceError::from)?;
            let order = checkout(
                &ctx.repo,
                &ctx.cart,
                &ctx.session,
                &ctx.cache,
                &ctx.notifier,
                notes,
            )?;
            println!(
                "{} Order #{} placed ({}), total {}",
                glyph(&Icon::Success),
                order.id,
                order.status,
                format_cents(order.total_cents)
            );
            return Ok(());
        }
    }

    println!("{}", render_cart(&ctx.cart.snapshot()));
    Ok(())
}

fn not_in_cart(product_id: ProductId) -> ServiceError {
    log::warn!("Product #{product_id} is not in the cart");
    ServiceError::NotFound
}
