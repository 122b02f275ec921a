//! Command-line back-office built on the library services.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::cache::{CachePolicy, QueryCache};
use crate::domain::types::{CustomerId, OrderId, PageSize, ProductId, SupplierId};
use crate::dto::query::{ListQueryParams, SortDirection};
use crate::models::config::AppConfig;
use crate::repository::HttpRepository;
use crate::repository::errors::RepositoryError;
use crate::services::notify::LogNotifier;
use crate::services::{FallbackView, ServiceError};
use crate::state::cart::CartContext;
use crate::state::session::SessionContext;
use crate::state::storage::{FileStorage, KeyValueStorage, StorageError};

pub mod cart;
pub mod icon;
pub mod list;
pub mod render;
pub mod session;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CommandResult<T> = Result<T, CommandError>;

impl From<RepositoryError> for CommandError {
    fn from(err: RepositoryError) -> Self {
        CommandError::Service(err.into())
    }
}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        CommandError::Service(err.into())
    }
}

impl CommandError {
    pub fn fallback(&self) -> FallbackView {
        match self {
            CommandError::Service(err) => FallbackView::from(err),
            _ => FallbackView::Unexpected,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pushkind-backoffice", version, about = "Storefront back-office client")]
pub struct Cli {
    /// Directory holding `default.yaml` and profile overrides.
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Configuration profile; defaults to `APP_ENV` or `local`.
    #[arg(long)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        /// Password; read from `APP_PASSWORD` when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user, re-validated against the API.
    Whoami,
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    Suppliers {
        #[command(subcommand)]
        action: SupplierAction,
    },
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long)]
    pub page_size: Option<usize>,
    #[arg(long)]
    pub sort_by: Option<String>,
    /// Sort descending.
    #[arg(long)]
    pub desc: bool,
    /// Structured filter as `name=value`; may be repeated.
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
    /// Print CSV instead of a table.
    #[arg(long)]
    pub csv: bool,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

#[derive(Debug, Clone, Args)]
pub struct CustomerFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SupplierFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub contact_email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Args)]
pub struct OrderFields {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CustomerAction {
    List(ListArgs),
    /// Read search text from stdin line by line and refresh the list as it settles.
    Search(ListArgs),
    Show { id: CustomerId },
    Create(CustomerFields),
    Update {
        id: CustomerId,
        #[command(flatten)]
        fields: CustomerFields,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrderAction {
    List(ListArgs),
    Search(ListArgs),
    Show { id: OrderId },
    Update {
        id: OrderId,
        #[command(flatten)]
        fields: OrderFields,
    },
}

#[derive(Debug, Subcommand)]
pub enum SupplierAction {
    List(ListArgs),
    Search(ListArgs),
    Show { id: SupplierId },
    Create(SupplierFields),
    Update {
        id: SupplierId,
        #[command(flatten)]
        fields: SupplierFields,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductAction {
    List(ListArgs),
    Search(ListArgs),
    Show { id: ProductId },
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    Show,
    Add {
        product_id: ProductId,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line; 0 removes it.
    Set { product_id: ProductId, quantity: u32 },
    Remove { product_id: ProductId },
    Clear,
    /// Place an order for the cart contents.
    Checkout {
        #[arg(long)]
        notes: Option<String>,
    },
}

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    pub config: AppConfig,
    pub session: Arc<SessionContext>,
    pub cart: CartContext,
    pub cache: Arc<QueryCache>,
    pub repo: HttpRepository,
    pub notifier: LogNotifier,
}

impl AppContext {
    pub fn new(config: AppConfig) -> CommandResult<Self> {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(&config.storage_dir));
        let session = Arc::new(SessionContext::hydrate(storage.clone())?);
        let cart = CartContext::hydrate(storage)?;
        let repo = HttpRepository::new(&config.api_url, config.request_timeout(), session.clone())?;

        Ok(Self {
            config,
            session,
            cart,
            cache: Arc::new(QueryCache::new(CachePolicy::default())),
            repo,
            notifier: LogNotifier,
        })
    }

    pub fn list_params(
        &self,
        args: &ListArgs,
        default_sort: &str,
        default_direction: SortDirection,
    ) -> CommandResult<ListQueryParams> {
        let page_size = match args.page_size {
            Some(size) => PageSize::new(size),
            None => self.config.page_size(),
        }
        .map_err(ServiceError::from)?;

        let direction = if args.desc {
            SortDirection::Descending
        } else {
            default_direction
        };
        let mut params = ListQueryParams::new(
            args.sort_by.as_deref().unwrap_or(default_sort),
            direction,
        )
        .with_page_size(page_size);
        if let Some(search) = &args.search {
            params = params.with_search(search.as_str());
        }
        for (name, value) in &args.filters {
            params = params.with_filter(name.as_str(), value.as_str());
        }
        Ok(params)
    }
}

pub fn run(ctx: &AppContext, command: Command) -> CommandResult<()> {
    match command {
        Command::Login { email, password } => session::login(ctx, email, password),
        Command::Logout => session::logout(ctx),
        Command::Whoami => session::whoami(ctx),
        Command::Customers { action } => list::customers(ctx, action),
        Command::Orders { action } => list::orders(ctx, action),
        Command::Suppliers { action } => list::suppliers(ctx, action),
        Command::Products { action } => list::products(ctx, action),
        Command::Cart { action } => cart::run(ctx, action),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "pushkind-backoffice",
            "orders",
            "list",
            "--filter",
            "status=shipped",
            "--page",
            "2",
        ])
        .expect("valid arguments");

        let Command::Orders {
            action: OrderAction::List(args),
        } = cli.command
        else {
            panic!("expected orders list");
        };
        assert_eq!(args.page, 2);
        assert_eq!(
            args.filters,
            vec![("status".to_string(), "shipped".to_string())]
        );
    }

    #[test]
    fn rejects_non_positive_ids() {
        assert!(Cli::try_parse_from(["pushkind-backoffice", "customers", "show", "0"]).is_err());
    }
}
