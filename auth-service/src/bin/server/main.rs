use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth::TokenManager;
use auth_service::config::Config;
use auth_service::domain::user::service::AuthService;
use auth_service::domain::user::service::StatelessRotation;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_issuer = %config.jwt.issuer,
        access_token_ttl_minutes = config.jwt.access_token_ttl_minutes,
        refresh_token_ttl_hours = config.jwt.refresh_token_ttl_hours,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_manager = Arc::new(TokenManager::new(config.jwt.token_config())?);
    let password_policy = config.password.policy()?;
    let password_hasher = PasswordHasher::with_policy(password_policy)?;
    tracing::info!(
        memory_cost_kib = password_policy.memory_cost_kib,
        time_cost = password_policy.time_cost,
        parallelism = password_policy.parallelism,
        max_concurrent_hashes = config.password.max_concurrent_hashes,
        "Password hasher configured"
    );

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let auth_service = Arc::new(
        AuthService::new(
            user_repository,
            Arc::new(StatelessRotation),
            Arc::clone(&token_manager),
            password_hasher,
        )
        .with_hashing_limit(config.password.max_concurrent_hashes),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, token_manager, &config.cors);

    let shutdown = Arc::new(Notify::new());
    let mut http_server = tokio::spawn({
        let shutdown = Arc::clone(&shutdown);
        async move {
            axum::serve(http_listener, http_application)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await
        }
    });

    tokio::select! {
        result = &mut http_server => {
            result??;
            tracing::info!("Server exited");
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    shutdown.notify_one();
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    match tokio::time::timeout(grace, http_server).await {
        Ok(result) => {
            result??;
            tracing::info!("Server shut down gracefully");
        }
        Err(_) => tracing::warn!(
            timeout_secs = config.server.shutdown_timeout_secs,
            "Graceful shutdown timed out, dropping in-flight requests"
        ),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
