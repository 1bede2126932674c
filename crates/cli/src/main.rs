//! PFG Chapati CLI - Drive the ordering flow from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the cart
//! chapati cart add --id x1 --name "Plain Chapati" --price 1500
//!
//! # Show the cart, or the rendered sidebar markup
//! chapati cart show
//! chapati cart show --html
//!
//! # Build a WhatsApp order link (rotates through contact numbers)
//! chapati order --button cart
//!
//! # Save a delivery address and check out (Ctrl-C cancels)
//! chapati profile set --address "Busega, Kampala"
//! chapati checkout
//!
//! # Detect the delivery location
//! chapati locate
//! chapati locate --lat 0.3136 --lon 32.5811
//!
//! # Warm the offline cache
//! chapati assets install
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, change, remove, clear, or show cart items
//! - `order` - Print a `wa.me` order link
//! - `checkout` - Place the order
//! - `profile` - Set or show saved customer details
//! - `locate` - Detect the delivery location
//! - `assets` - Install, activate, or fetch through the offline cache
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Log filter (default: `chapati_cli=info,chapati_ordering=info`)
//! - `CHAPATI_LOG_JSON` - Set to `1` or `true` for JSON log output
//! - `CHAPATI_*` - Ordering configuration, see `chapati_ordering::config`

#![cfg_attr(not(test), forbid(unsafe_code))]

use chapati_core::OrderButton;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "chapati")]
#[command(author, version, about = "PFG Chapati ordering tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Print a WhatsApp order link
    Order {
        /// Which order button was pressed (cart, floating, hero, large)
        #[arg(short, long, default_value = "cart")]
        button: OrderButton,
    },
    /// Place the order (Ctrl-C cancels)
    Checkout {
        /// Delivery address to save before checking out
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Manage saved customer details
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Detect the delivery location
    Locate {
        /// Latitude in decimal degrees (skips the network lookup)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Work with the offline asset cache
    Assets {
        #[command(subcommand)]
        action: AssetsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price in minor currency units
        #[arg(short, long)]
        price: String,

        /// Product image URL
        #[arg(short, long, default_value = "")]
        image: String,
    },
    /// Raise a product's quantity by one
    Increase {
        /// Product ID
        id: String,
    },
    /// Lower a product's quantity by one
    Decrease {
        /// Product ID
        id: String,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Show the cart
    Show {
        /// Print the rendered sidebar markup instead of a summary
        #[arg(long)]
        html: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update saved customer details
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        instructions: Option<String>,
    },
    /// Show saved customer details
    Show,
}

#[derive(Subcommand)]
enum AssetsAction {
    /// Precache the app shell
    Install,
    /// Precache the app shell and delete caches from older versions
    Activate,
    /// Fetch a URL through the cache
    Fetch {
        /// Absolute URL or site-relative path
        url: String,

        /// Treat the request as a page navigation
        #[arg(long, conflicts_with = "image")]
        navigation: bool,

        /// Treat the request as an image load
        #[arg(long)]
        image: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, optionally as JSON.
fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chapati_cli=info,chapati_ordering=info".into());
    let json = std::env::var("CHAPATI_LOG_JSON")
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                name,
                price,
                image,
            } => commands::cart::add(&id, &name, &price, &image)?,
            CartAction::Increase { id } => commands::cart::increase(&id)?,
            CartAction::Decrease { id } => commands::cart::decrease(&id)?,
            CartAction::Remove { id } => commands::cart::remove(&id)?,
            CartAction::Clear => commands::cart::clear()?,
            CartAction::Show { html } => commands::cart::show(html)?,
        },
        Commands::Order { button } => commands::order::whatsapp(button)?,
        Commands::Checkout { address } => commands::checkout::run(address).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Set {
                name,
                phone,
                email,
                address,
                instructions,
            } => commands::profile::set(chapati_ordering::profile::ProfileUpdate {
                name,
                phone,
                email,
                address,
                instructions,
            })?,
            ProfileAction::Show => commands::profile::show()?,
        },
        Commands::Locate { lat, lon } => commands::locate::run(lat.zip(lon)).await?,
        Commands::Assets { action } => match action {
            AssetsAction::Install => commands::assets::install().await?,
            AssetsAction::Activate => commands::assets::activate().await?,
            AssetsAction::Fetch {
                url,
                navigation,
                image,
            } => commands::assets::fetch(&url, navigation, image).await?,
        },
    }
    Ok(())
}
