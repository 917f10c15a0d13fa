//! Field Mapper
//! Web API Server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use field_mapper::{
    api, build_state,
    config::AppConfig,
    db,
    services::{HttpFetchAction, IntervalJobRegistry},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "field_mapper=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Field Mapper Web Server...");

    let config = AppConfig::load().context("Failed to load configuration")?;

    // 初始化存储
    let storage = db::init_storage(&config)
        .await
        .context("Failed to initialize storage")?;

    tracing::info!("Storage initialized successfully");

    let registry = Arc::new(IntervalJobRegistry::new());
    let action = Arc::new(
        HttpFetchAction::new(config.fetch_url.clone(), config.fetch_timeout())
            .context("Failed to build HTTP client")?,
    );
    tracing::info!(
        "Fetch job target: {} every {}s",
        action.url(),
        config.fetch_interval().as_secs()
    );

    let state = build_state(storage, registry, action, &config);

    // 恢复已启用的定时任务
    state
        .schedulers
        .restore_jobs()
        .await
        .context("Failed to restore scheduled jobs")?;

    let schedulers = state.schedulers.clone();

    let app = Router::new()
        .merge(api::create_router(state, api::cors_layer(&config.origins())))
        // 请求追踪
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("API available at http://{}/api", addr);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    schedulers.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
