//! Kiosk admin CLI - product tables, stock and kiosk management.
//!
//! # Usage
//!
//! ```bash
//! # Catalogue in default order (visible first, then Czech name order)
//! ka-cli products list
//!
//! # Inventory of kiosk 3, price descending then name
//! ka-cli products list --kiosk 3 --inventory --sort price:desc,name:asc
//!
//! # Set stock; zero also hides the product at the kiosk
//! ka-cli stock set 12 --kiosk 3 0
//!
//! # Deactivate a kiosk
//! ka-cli kiosks deactivate 3
//! ```
//!
//! # Environment Variables
//!
//! - `KIOSK_ADMIN_API_URL` - Admin API base URL (required)
//! - `KIOSK_ADMIN_API_TOKEN` - Bearer token
//! - `KIOSK_ADMIN_LOG_JSON` - Emit JSON logs
//! - `SENTRY_DSN` - Enable error tracking
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use kiosk_admin::{AdminConfig, Dashboard};
use kiosk_admin_core::{KioskId, ProductId, SortConfiguration};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ka-cli")]
#[command(author, version, about = "Kiosk admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Product catalogue and inventory
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Per-kiosk stock levels
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Per-kiosk product visibility
    Visibility {
        #[command(subcommand)]
        action: VisibilityAction,
    },
    /// Kiosk management
    Kiosks {
        #[command(subcommand)]
        action: KioskAction,
    },
    /// Keep a product table on screen, revalidating in the background
    Watch {
        /// Kiosk whose inventory to show
        #[arg(short, long)]
        kiosk: KioskId,

        /// Sort criteria, e.g. `visibility:asc,name:asc`
        #[arg(short, long)]
        sort: Option<SortConfiguration>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Print products as a sorted table
    List {
        /// Kiosk to show
        #[arg(short, long)]
        kiosk: Option<KioskId>,

        /// Show the kiosk's inventory instead of the catalogue
        #[arg(short, long, requires = "kiosk")]
        inventory: bool,

        /// Sort criteria, e.g. `price:desc,name:asc`
        #[arg(short, long)]
        sort: Option<SortConfiguration>,
    },
    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: Decimal,

        #[arg(short, long)]
        description: Option<String>,

        /// Image URL or path
        #[arg(long)]
        image: Option<String>,
    },
    /// Update a product
    Update {
        id: ProductId,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: Decimal,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum StockAction {
    /// Set the quantity in stock
    Set {
        product: ProductId,

        #[arg(short, long)]
        kiosk: KioskId,

        quantity: u32,
    },
}

#[derive(Subcommand)]
enum VisibilityAction {
    /// Show a product at a kiosk
    Show {
        product: ProductId,

        #[arg(short, long)]
        kiosk: KioskId,
    },
    /// Hide a product at a kiosk
    Hide {
        product: ProductId,

        #[arg(short, long)]
        kiosk: KioskId,
    },
}

#[derive(Subcommand)]
enum KioskAction {
    /// List kiosks
    List {
        /// Include deactivated kiosks
        #[arg(short, long)]
        all: bool,
    },
    /// Create a kiosk
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        location: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Update a kiosk
    Update {
        id: KioskId,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        location: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Deactivate a kiosk (kept on the server)
    Deactivate { id: KioskId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kiosk_admin=info,kiosk_admin_cli=info".into());

    let json_layer = log_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer =
        (!log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AdminConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::connect(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List {
                kiosk,
                inventory,
                sort,
            } => commands::products::list(&mut dashboard, kiosk, inventory, sort).await?,
            ProductAction::Create {
                name,
                price,
                description,
                image,
            } => {
                let draft = commands::products::draft(name, price, description, image);
                commands::products::create(&dashboard, draft).await?;
            }
            ProductAction::Update {
                id,
                name,
                price,
                description,
                image,
            } => {
                let draft = commands::products::draft(name, price, description, image);
                commands::products::update(&dashboard, id, draft).await?;
            }
            ProductAction::Delete { id } => commands::products::delete(&dashboard, id).await?,
        },
        Commands::Stock { action } => match action {
            StockAction::Set {
                product,
                kiosk,
                quantity,
            } => commands::products::set_stock(&mut dashboard, product, kiosk, quantity).await?,
        },
        Commands::Visibility { action } => match action {
            VisibilityAction::Show { product, kiosk } => {
                commands::products::set_visibility(&mut dashboard, product, kiosk, true).await?;
            }
            VisibilityAction::Hide { product, kiosk } => {
                commands::products::set_visibility(&mut dashboard, product, kiosk, false).await?;
            }
        },
        Commands::Kiosks { action } => match action {
            KioskAction::List { all } => commands::kiosks::list(&dashboard, all).await?,
            KioskAction::Create {
                name,
                location,
                description,
            } => commands::kiosks::create(&dashboard, name, location, description).await?,
            KioskAction::Update {
                id,
                name,
                location,
                description,
            } => commands::kiosks::update(&dashboard, id, name, location, description).await?,
            KioskAction::Deactivate { id } => commands::kiosks::deactivate(&dashboard, id).await?,
        },
        Commands::Watch { kiosk, sort } => {
            commands::products::watch(&mut dashboard, kiosk, sort).await?;
        }
    }
    Ok(())
}
