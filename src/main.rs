// Main entry point for the MedipolDAO verification API

use medipoldao_api::api::{create_router, AppState};
use medipoldao_api::config::Config;
use medipoldao_api::core::traits::{MemberStore, Notifier};
use medipoldao_api::engine::VerificationEngine;
use medipoldao_api::infra::{MongoMemberStore, SendGridClient};

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing subscriber with config values
    // Must be done only once - tracing panics if init() is called multiple times
    init_tracing(&config);

    info!("Starting MedipolDAO verification API");

    info!(
        bind_address = %config.bind_address,
        port = config.port,
        "Configuration loaded"
    );

    // 3. Initialize credential store
    let store: Arc<dyn MemberStore> = Arc::new(
        MongoMemberStore::new(&config.mongodb_url)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to initialize credential store");
                e
            })?,
    );

    info!("Credential store initialized");

    // 4. Initialize email notifier
    let notifier: Arc<dyn Notifier> = Arc::new(SendGridClient::new(
        config.sendgrid_api_key.clone(),
        config.sender_email.clone(),
    ));

    info!("Email notifier initialized");

    // 5. Initialize verification engine
    let engine = Arc::new(VerificationEngine::new(
        store.clone(),
        notifier.clone(),
        config.accepted_domains.clone(),
        config.website_domain.clone(),
        config.otp_ttl_secs,
    ));

    info!("Verification engine initialized");

    // 6. Create AppState
    let app_state = AppState {
        engine,
        store,
        notifier,
        config: Arc::new(config.clone()),
    };

    // 7. Create router
    let router = create_router(&app_state).with_state(app_state);

    info!("Router created");

    // 8. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        e
    })?;

    info!(addr = %addr, "Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
///
/// RUST_LOG takes precedence over the configured level; the level string was
/// already validated during config load.
fn init_tracing(config: &Config) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolve when either Ctrl+C or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, starting graceful shutdown"),
        _ = terminate => info!("SIGTERM received, starting graceful shutdown"),
    }
}
