//! Lampshop CLI - Command-line admin client.
//!
//! # Usage
//!
//! ```bash
//! # Log in and print a token to export as LAMPSHOP_TOKEN
//! lampshop --username admin --password '...' login
//!
//! # Browse the catalog
//! lampshop categories
//! lampshop attributes lamps
//! lampshop products list
//!
//! # Create and edit products
//! lampshop products create --sku LMP-1 --name "Desk lamp" --category lamps --attr power=60
//! lampshop products edit 7 --price 39.9 --attr color=brass
//!
//! # Move an order along
//! lampshop orders status 10 shipped
//! ```
//!
//! # Commands
//!
//! - `login` - Exchange username/password for a token
//! - `categories`, `attributes` - Inspect categories and their attribute schemas
//! - `products` - List, show, create, edit and delete products
//! - `orders` - List orders and change their status

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lampshop_admin::{AppError, ClientConfig};
use lampshop_core::{OrderId, OrderStatus, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::products::ProductArgs;

#[derive(Parser)]
#[command(name = "lampshop")]
#[command(author, version, about = "Lampshop admin client")]
struct Cli {
    /// Log in as this user before running the command
    #[arg(long, global = true, env = "LAMPSHOP_USERNAME")]
    username: Option<String>,

    /// Password for --username
    #[arg(long, global = true, env = "LAMPSHOP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the issued token
    Login,
    /// List categories
    Categories,
    /// Show the attribute schema of a category
    Attributes {
        /// Category id
        category: String,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Show one product
    Show { id: i64 },
    /// Delete a product
    Delete { id: i64 },
    /// Create a product
    Create {
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Edit a product
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ProductArgs,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List all orders
    List,
    /// Change an order's status
    Status {
        id: i64,
        /// New status (pending, processing, shipped, delivered)
        status: OrderStatus,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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

/// Initialize tracing on stderr, keeping stdout for command output.
fn init_tracing(config: &ClientConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lampshop_admin=info,lampshop_cli=info".into());

    let json_layer = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::error(&e);
            return ExitCode::from(AppError::from(e).exit_code());
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            output::error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), AppError> {
    let gateway = config.gateway()?;

    let login = commands::auth::credentials(cli.username, cli.password, config)?;
    if let Commands::Login = cli.command {
        let Some((username, password)) = login else {
            return Err(AppError::BadRequest(
                "login needs --username and --password".to_string(),
            ));
        };
        return commands::auth::login(&gateway, &username, &password).await;
    }
    if let Some((username, password)) = login {
        commands::auth::sign_in(&gateway, &username, &password).await?;
    }

    match cli.command {
        Commands::Login => {}
        Commands::Categories => commands::catalog::categories(&gateway).await?,
        Commands::Attributes { category } => {
            commands::catalog::attributes(&gateway, &category).await?;
        }
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(&gateway, config).await?,
            ProductAction::Show { id } => {
                commands::products::show(&gateway, ProductId::new(id)).await?;
            }
            ProductAction::Delete { id } => {
                commands::products::delete(&gateway, config, ProductId::new(id)).await?;
            }
            ProductAction::Create { fields } => {
                commands::products::create(&gateway, config, fields).await?;
            }
            ProductAction::Edit { id, fields } => {
                commands::products::edit(&gateway, config, ProductId::new(id), fields).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&gateway, config).await?,
            OrderAction::Status { id, status } => {
                commands::orders::change_status(&gateway, config, OrderId::new(id), status)
                    .await?;
            }
        },
    }
    Ok(())
}
