mod api;
mod cache;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use fbpulse_core::FeedbackStore;
use fbpulse_enrich::{EnrichConfig, Enricher, HttpEnricher};

use crate::api::{build_app, default_rate_limit_state, AppState};
use crate::cache::InsightCache;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = fbpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = fbpulse_db::PoolConfig::from_app_config(&config);
    let pool = fbpulse_db::connect_pool(&config.database_url, pool_config).await?;
    fbpulse_db::run_migrations(&pool).await?;

    let store: Arc<dyn FeedbackStore> = Arc::new(fbpulse_db::PgStore::new(pool));
    let enricher: Arc<dyn Enricher> =
        Arc::new(HttpEnricher::new(EnrichConfig::from_app_config(&config))?);

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&store),
        Arc::clone(&enricher),
        config.enrich_interval_secs,
        config.enrich_batch_size,
    )
    .await?;

    let state = AppState {
        store,
        enricher,
        cache: InsightCache::new(Duration::from_secs(config.cache_ttl_secs)),
    };
    let app = build_app(state, default_rate_limit_state());

    tracing::info!(addr = %config.bind_addr, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
