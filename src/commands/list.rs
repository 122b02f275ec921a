//! List, show, search, create and update commands for the entity screens.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use crate::commands::render::{
    TableRow, heading, render_csv, render_details, render_pagination, render_table,
};
use crate::commands::{
    AppContext, CommandResult, CustomerAction, CustomerFields, ListArgs, OrderAction, OrderFields,
    ProductAction, SupplierAction, SupplierFields,
};
use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::supplier::Supplier;
use crate::domain::{Editable, Resource};
use crate::dto::query::{FilterPatch, SortDirection};
use crate::forms::DialogForm;
use crate::forms::customer::CustomerForm;
use crate::forms::order::OrderForm;
use crate::forms::supplier::SupplierForm;
use crate::services::dialog::EntityDialog;
use crate::services::list::{ListController, fetch_detail};
use crate::services::notify::{Notification, Notifier};
use crate::services::search::SearchBinder;
use crate::services::{ServiceError, ServiceResult};
use crate::state::session::SessionContext;

/// Default ordering of a listed entity.
pub trait Listing: Resource + TableRow {
    const DEFAULT_SORT: &'static str;
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Ascending;
}

impl Listing for Customer {
    const DEFAULT_SORT: &'static str = "name";
}

impl Listing for Order {
    const DEFAULT_SORT: &'static str = "createdAt";
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Descending;
}

impl Listing for Supplier {
    const DEFAULT_SORT: &'static str = "name";
}

impl Listing for Product {
    const DEFAULT_SORT: &'static str = "name";
}

fn require_admin(session: &SessionContext) -> ServiceResult<()> {
    match session.current_user() {
        Some(user) if user.has_role(crate::SERVICE_ADMIN_ROLE) => Ok(()),
        Some(user) => {
            log::warn!("{} lacks the {} role", user.email, crate::SERVICE_ADMIN_ROLE);
            Err(ServiceError::Unauthorized)
        }
        None => Err(ServiceError::Unauthorized),
    }
}

pub fn customers(ctx: &AppContext, action: CustomerAction) -> CommandResult<()> {
    require_admin(&ctx.session)?;
    match action {
        CustomerAction::List(args) => list::<Customer>(ctx, &args),
        CustomerAction::Search(args) => search::<Customer>(ctx, &args),
        CustomerAction::Show { id } => show::<Customer>(ctx, id),
        CustomerAction::Create(fields) => {
            save::<Customer, CustomerForm>(ctx, None, |form| fill_customer(form, fields))
        }
        CustomerAction::Update { id, fields } => {
            save::<Customer, CustomerForm>(ctx, Some(id), |form| fill_customer(form, fields))
        }
    }
}

pub fn orders(ctx: &AppContext, action: OrderAction) -> CommandResult<()> {
    require_admin(&ctx.session)?;
    match action {
        OrderAction::List(args) => list::<Order>(ctx, &args),
        OrderAction::Search(args) => search::<Order>(ctx, &args),
        OrderAction::Show { id } => show::<Order>(ctx, id),
        OrderAction::Update { id, fields } => {
            save::<Order, OrderForm>(ctx, Some(id), |form| fill_order(form, fields))
        }
    }
}

pub fn suppliers(ctx: &AppContext, action: SupplierAction) -> CommandResult<()> {
    require_admin(&ctx.session)?;
    match action {
        SupplierAction::List(args) => list::<Supplier>(ctx, &args),
        SupplierAction::Search(args) => search::<Supplier>(ctx, &args),
        SupplierAction::Show { id } => show::<Supplier>(ctx, id),
        SupplierAction::Create(fields) => {
            save::<Supplier, SupplierForm>(ctx, None, |form| fill_supplier(form, fields))
        }
        SupplierAction::Update { id, fields } => {
            save::<Supplier, SupplierForm>(ctx, Some(id), |form| fill_supplier(form, fields))
        }
    }
}

pub fn products(ctx: &AppContext, action: ProductAction) -> CommandResult<()> {
    match action {
        ProductAction::List(args) => list::<Product>(ctx, &args),
        ProductAction::Search(args) => search::<Product>(ctx, &args),
        ProductAction::Show { id } => show::<Product>(ctx, id),
    }
}

fn fill_customer(form: &mut CustomerForm, fields: CustomerFields) {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(email) = fields.email {
        form.email = email;
    }
    if let Some(phone) = fields.phone {
        form.phone = phone;
    }
    if let Some(address) = fields.address {
        form.address = address;
    }
}

fn fill_supplier(form: &mut SupplierForm, fields: SupplierFields) {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(email) = fields.contact_email {
        form.contact_email = email;
    }
    if let Some(phone) = fields.phone {
        form.phone = phone;
    }
    if let Some(website) = fields.website {
        form.website = website;
    }
    if let Some(active) = fields.active {
        form.active = active;
    }
}

fn fill_order(form: &mut OrderForm, fields: OrderFields) {
    if let Some(status) = fields.status {
        form.status = status;
    }
    if let Some(notes) = fields.notes {
        form.notes = notes;
    }
}

fn new_controller<T: Listing>(ctx: &AppContext, args: &ListArgs) -> CommandResult<ListController<T>> {
    let params = ctx.list_params(args, T::DEFAULT_SORT, T::DEFAULT_DIRECTION)?;
    Ok(ListController::new(ctx.cache.clone(), params))
}

fn print_page<T: Listing>(list: &ListController<T>, ctx: &AppContext) {
    println!("{}", heading::<T>(&format!("{}s", T::LABEL)));
    println!("{}", render_table(list.items()));
    let view = list.pagination(ctx.config.pagination_window());
    println!("{}", render_pagination(&view, list.total_items()));
}

fn list<T: Listing>(ctx: &AppContext, args: &ListArgs) -> CommandResult<()> {
    let mut list = new_controller::<T>(ctx, args)?;
    if args.page > 1 {
        list.apply_filters(FilterPatch::new().page(args.page));
    }

    if let Err(err) = list.load(&ctx.repo) {
        ctx.notifier.notify(Notification::destructive(
            format!("Could not load {}s", T::LABEL.to_lowercase()),
            &err,
        ));
        return Err(err.into());
    }
    if list.params().page() > list.total_pages() && list.total_items() > 0 {
        let last = list.total_pages();
        list.go_to_page(&ctx.repo, last)?;
    }

    if args.csv {
        print!("{}", render_csv(list.items())?);
    } else {
        print_page(&list, ctx);
    }
    Ok(())
}

fn show<T: Listing>(ctx: &AppContext, id: T::Id) -> CommandResult<()> {
    let record = fetch_detail::<T, _>(&ctx.repo, &ctx.cache, id)?;
    println!("{}", heading::<T>(&format!("{} #{id}", T::LABEL)));
    println!("{}", render_details(&record));
    Ok(())
}

/// Opens the dialog in create or edit mode, lets `fill` change the form and
/// submits it.
fn save<T, F>(ctx: &AppContext, id: Option<T::Id>, fill: impl FnOnce(&mut F)) -> CommandResult<()>
where
    T: Listing + Editable,
    F: DialogForm<T>,
{
    let mut list = new_controller::<T>(ctx, &ListArgs::default())?;
    let mut dialog = EntityDialog::<T, F>::new();

    match id {
        Some(id) => {
            let record = fetch_detail::<T, _>(&ctx.repo, &ctx.cache, id)?;
            dialog.open_edit(record);
        }
        None => {
            dialog.open_create();
        }
    }
    if let Some(form) = dialog.form_mut() {
        fill(form);
    }

    match dialog.submit(&ctx.repo, &mut list, &ctx.notifier) {
        Ok(record) => {
            println!("{}", render_details(&record));
            Ok(())
        }
        Err(err) => {
            if let Some(errors) = dialog.validation_errors() {
                for (field, problems) in errors.field_errors() {
                    for problem in problems {
                        eprintln!("{field}: {}", problem.code);
                    }
                }
            }
            Err(err.into())
        }
    }
}

/// Treats each stdin line as the current content of a search box and
/// refreshes the list once the input settles.
fn search<T: Listing>(ctx: &AppContext, args: &ListArgs) -> CommandResult<()> {
    let mut list = new_controller::<T>(ctx, args)?;
    list.load(&ctx.repo)?;
    print_page(&list, ctx);

    let mut binder = SearchBinder::new(ctx.config.search_quiet_period())
        .with_initial(args.search.clone().unwrap_or_default());
    if let Some(max_wait) = ctx.config.search_max_wait() {
        binder = binder.with_max_wait(max_wait);
    }

    let (sender, receiver) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::error!("Failed to read search input: {err}");
                    break;
                }
            }
        }
    });

    loop {
        let received = match binder.deadline() {
            Some(deadline) => {
                receiver.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => binder.input(line, Instant::now()),
            Err(RecvTimeoutError::Timeout) => flush(&mut binder, &mut list, ctx, Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(deadline) = binder.deadline() {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    flush(&mut binder, &mut list, ctx, deadline);
                }
                binder.teardown();
                return Ok(());
            }
        }
    }
}

fn flush<T: Listing>(
    binder: &mut SearchBinder,
    list: &mut ListController<T>,
    ctx: &AppContext,
    now: Instant,
) {
    match binder.flush_into(now, list, &ctx.repo) {
        Ok(true) => print_page(list, ctx),
        Ok(false) => {}
        Err(err) => ctx.notifier.notify(Notification::destructive(
            format!("Could not search {}s", T::LABEL.to_lowercase()),
            &err,
        )),
    }
}
