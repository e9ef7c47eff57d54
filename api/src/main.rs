use std::sync::Arc;

use actix_web::{web, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rh_api::{create_app, AppState};
use rh_core::services::token::TokenCleanupConfig;
use rh_core::{
    AccessTokenBlacklist, AccessTokenIssuer, AuthService, AuthServiceConfig, Clock,
    RefreshTokenStore, Rs256KeyManager, SystemClock, TokenCleanupService, TokenServiceConfig,
    TokenValidationPolicy,
};
use rh_infra::config::InfrastructureConfig;
use rh_shared::config::{AppConfig, LogFormat, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},actix_web=info,sqlx=warn", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting ReportHub API Server");

    // Signing keys are loaded once; without them no token can be issued or checked
    let keys = match Rs256KeyManager::from_config(&config.auth.jwt) {
        Ok(keys) => Arc::new(keys),
        Err(e) => {
            error!(error = %e, "Failed to load JWT signing keys");
            std::process::exit(1);
        }
    };

    let infra = rh_infra::initialize(&InfrastructureConfig {
        database: config.database.clone(),
        cache: config.cache.clone(),
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to connect to storage");
        io_error(e)
    })?;
    infra.database.run_migrations().await.map_err(io_error)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let token_config = TokenServiceConfig::from_jwt_config(&config.auth.jwt);
    let cache = infra.cache_store();

    let issuer = Arc::new(AccessTokenIssuer::new(keys.clone(), token_config.clone()));
    let refresh_store = Arc::new(RefreshTokenStore::new(
        cache.clone(),
        infra.refresh_token_repository(),
        token_config.refresh_token_lifetime(),
    ));
    let blacklist = Arc::new(AccessTokenBlacklist::new(
        cache,
        token_config.access_token_lifetime(),
    ));
    let policy = Arc::new(TokenValidationPolicy::with_blacklist(
        keys,
        &token_config,
        blacklist.clone(),
        clock.clone(),
    ));
    let (authenticator, users) = infra.user_directory();
    let auth = Arc::new(AuthService::new(
        authenticator,
        users,
        issuer,
        refresh_store.clone(),
        blacklist,
        clock.clone(),
        AuthServiceConfig::from(&config.auth),
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        refresh_store,
        clock,
        TokenCleanupConfig::from(&config.auth.cleanup),
    ));
    let cleanup_handle = cleanup.start_background_task();

    let state = web::Data::new(AppState::new(auth, policy, config.auth.cookie.clone()));
    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    let result = server.bind(&bind_address)?.run().await;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    infra.database.close().await;
    result
}
