//! Shopfront CLI - Inspect and edit a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart stored in the profile directory
//! sf-cli cart show
//!
//! # Add two units of a product (price and name are snapshotted)
//! sf-cli cart add p1 --name "Shirt" --price 20.00 --quantity 2 --image /img/shirt.png
//!
//! # Change or remove a line (by line ID or product ID)
//! sf-cli cart set-quantity p1 5
//! sf-cli cart remove p1
//!
//! # Empty the cart, or delete the storage slot entirely
//! sf-cli cart clear
//! sf-cli cart purge
//! ```
//!
//! # Environment Variables
//!
//! See `shopfront_storefront::config` (`CART_STORAGE_DIR`, `CART_STORAGE_KEY`,
//! `CART_CURRENCY`, `SENTRY_DSN`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::CartConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Catalog product ID
        product_id: String,

        /// Display name to snapshot
        #[arg(short, long)]
        name: String,

        /// Unit price to snapshot (e.g. 19.99)
        #[arg(short, long)]
        price: String,

        /// Units to add
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,

        /// Image URL or path
        #[arg(short, long, default_value = "")]
        image: String,
    },
    /// Remove a line (by line ID or product ID)
    Remove {
        /// Line ID or product ID
        target: String,
    },
    /// Replace the quantity of a line (by line ID or product ID)
    SetQuantity {
        /// Line ID or product ID
        target: String,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove every line
    Clear,
    /// Delete the storage slot
    Purge,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = CartConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sf_cli=info,shopfront_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &CartConfig) -> Result<(), commands::cart::CartCommandError> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(config)?,
            CartAction::Add {
                product_id,
                name,
                price,
                quantity,
                image,
            } => commands::cart::add(config, &product_id, &name, &price, &quantity, &image)?,
            CartAction::Remove { target } => commands::cart::remove(config, &target)?,
            CartAction::SetQuantity { target, quantity } => {
                commands::cart::set_quantity(config, &target, &quantity)?;
            }
            CartAction::Clear => commands::cart::clear(config)?,
            CartAction::Purge => commands::cart::purge(config)?,
        },
    }
    Ok(())
}
