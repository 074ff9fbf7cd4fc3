//! Vitrine CLI - browse the catalog, filter by category and build a cart.
//!
//! # Usage
//!
//! ```bash
//! # List categories
//! vitrine categories
//!
//! # Show the first two pages, only categories 1 and 3, matching "lamp"
//! vitrine browse --pages 2 --category 1 --category 3 --search lamp
//!
//! # Restore a filter from a shared URL query value
//! vitrine browse --query 1,3
//!
//! # Add products 12 (x2) and 40 (x1) and print the cart total
//! vitrine cart --add 12:2 --add 40
//! ```
//!
//! # Commands
//!
//! - `categories` - List product categories
//! - `browse` - Load catalog pages and print the filtered view
//! - `cart` - Build a cart from loaded products and print its summary
//!
//! Configuration is read from the environment (see `vitrine_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_storefront::StorefrontConfig;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List product categories
    Categories,
    /// Load catalog pages and print the filtered product list
    Browse {
        /// Maximum number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Category id to include (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<i64>,

        /// Selection as a `categories` query value, e.g. `1,3,4`
        #[arg(short, long, conflicts_with = "categories")]
        query: Option<String>,

        /// Only show products whose name or description contains this term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add loaded products to a cart and print the summary
    Cart {
        /// Product to add, as `ID` or `ID:QTY` (repeatable)
        #[arg(short, long = "add", required = true)]
        items: Vec<String>,

        /// Maximum number of pages to load when looking up products
        #[arg(short, long, default_value_t = 5)]
        pages: u32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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

// The session is single-threaded, so a current-thread runtime drives it.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_cli=info,vitrine_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), CliError> {
    match cli.command {
        Commands::Categories => commands::catalog::categories(config).await?,
        Commands::Browse {
            pages,
            categories,
            query,
            search,
        } => {
            let filter = commands::catalog::BrowseFilter {
                categories,
                query,
                search,
            };
            commands::catalog::browse(config, pages, &filter).await?;
        }
        Commands::Cart { items, pages } => commands::cart::build(config, &items, pages).await?,
    }
    Ok(())
}
