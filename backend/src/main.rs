//! Bank API Backend
//!
//! Account management over HTTP with password login and token-gated
//! account access.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Auth: credential hashing, tokens, and the authorization gate
//! - Services: Business logic
//! - Repositories: Account storage (PostgreSQL or in-memory)

use anyhow::Result;
use bank_api_backend::{
    config,
    db,
    repositories::{AccountStore, InMemoryAccountStore, PgAccountStore},
    routes,
    services::AccountService,
    state::AppState,
};
use bank_api_shared::CreateAccountRequest;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line options
#[derive(Parser, Debug)]
#[command(name = "bank-api-backend", version, about = "Bank account API server")]
struct Cli {
    /// Create a demo account before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration; a missing signing secret stops startup here
    let config = match config::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Bank API Backend"
    );

    let store = create_store(&config).await?;

    // Create application state
    let state = AppState::new(store, config.clone())?;

    if cli.seed {
        seed_accounts(&state).await?;
    }

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Build the configured account store
async fn create_store(config: &config::AppConfig) -> Result<Arc<dyn AccountStore>> {
    if config.database.in_memory {
        warn!("Using in-memory account store; data is lost on shutdown");
        return Ok(Arc::new(InMemoryAccountStore::new()));
    }

    info!("Connecting to database...");
    let pool = db::create_pool(&config.database).await?;
    let store = PgAccountStore::new(pool);
    store.init().await?;
    Ok(Arc::new(store))
}

/// Create a demo account and log its number
async fn seed_accounts(state: &AppState) -> Result<()> {
    info!("Seeding the account store");
    let account = AccountService::create(
        state.store(),
        state.codec(),
        CreateAccountRequest {
            first_name: "Andres".to_string(),
            last_name: "CG".to_string(),
            password: "password-1".to_string(),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to seed account: {}", e))?;

    info!(account_id = %account.id, number = account.number, "Seeded demo account");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "bank_api_backend=info,tower_http=info".into()
        } else {
            "bank_api_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
