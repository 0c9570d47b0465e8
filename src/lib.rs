use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod config;
pub mod db;
pub mod docstore;
pub mod entities;
pub mod state;

pub use config::Config;
pub use state::AppState;

/// Boot sequence: config, tracing, both stores, router, serve until
/// ctrl-c.
pub async fn run() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config.log_level);

    info!("Starting cinelog v{}", env!("CARGO_PKG_VERSION"));

    let store = db::Store::with_pool_options(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    let docs: Arc<dyn docstore::DocStore> = Arc::new(
        docstore::MongoDocStore::connect(&config.docstore.uri, &config.docstore.database).await?,
    );

    let port = config.server.port;
    let state = Arc::new(AppState {
        config,
        store,
        docs,
    });

    let app = api::router(&state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown signal received");
}
