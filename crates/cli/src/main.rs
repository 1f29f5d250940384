//! Cinecart CLI - catalog, cart and chat from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! cinecart register -n "Ana Souza" -d 123.456.789-09 -e ana@example.com -p secret1
//!
//! # Check credentials
//! cinecart -e ana@example.com -p secret1 login
//!
//! # List the catalog
//! cinecart -e ana@example.com -p secret1 products
//!
//! # Buy two of product 1 and one of product 2
//! cinecart -e ana@example.com -p secret1 checkout 1 1 2
//!
//! # Talk to the assistant or to other shoppers (one message per line)
//! cinecart -e ana@example.com -p secret1 chat ai
//! cinecart chat live
//! ```
//!
//! Credentials may also come from `CINECART_EMAIL` and `CINECART_PASSWORD`.
//! See [`cinecart_client::config`] for the remaining environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinecart_client::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "cinecart")]
#[command(author, version, about = "Cinecart storefront and chat client")]
struct Cli {
    #[command(flatten)]
    login: LoginArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LoginArgs {
    /// Account email
    #[arg(short, long, global = true, env = "CINECART_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(short, long, global = true, env = "CINECART_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and report whether it worked
    Login,
    /// Create an account
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Document number; formatting is ignored
        #[arg(short, long)]
        document: String,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// List the product catalog
    Products,
    /// Add products to the cart and place the order
    Checkout {
        /// Product ids; repeat an id to buy more than one
        #[arg(required = true)]
        product_ids: Vec<String>,
    },
    /// Chat from the terminal
    Chat {
        #[command(subcommand)]
        target: ChatTarget,
    },
}

#[derive(Subcommand)]
enum ChatTarget {
    /// Ask the AI assistant
    Ai,
    /// Join the live chat
    Live,
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

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cinecart_client=info,cinecart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let login = cli.login;
    match cli.command {
        Commands::Login => {
            let session = commands::login(&config, login.email, login.password).await?;
            commands::account::report_login(&session);
        }
        Commands::Register {
            name,
            document,
            confirm,
        } => {
            commands::account::register(&config, &name, &document, login.email, login.password, confirm)
                .await?;
        }
        Commands::Products => {
            let session = commands::login(&config, login.email, login.password).await?;
            commands::catalog::list_products(&session).await?;
        }
        Commands::Checkout { product_ids } => {
            let session = commands::login(&config, login.email, login.password).await?;
            commands::catalog::checkout(&session, &product_ids).await?;
        }
        Commands::Chat { target } => match target {
            ChatTarget::Ai => {
                let session = commands::login(&config, login.email, login.password).await?;
                commands::chat::ai(&session).await?;
            }
            ChatTarget::Live => commands::chat::live(&config).await?,
        },
    }
    Ok(())
}
