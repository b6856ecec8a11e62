use std::{str::FromStr, sync::Arc};

use genesis_erp::{
    core::db::{init_pool, run_migrations, seed_defaults},
    init_openapi_route,
    settings::get_config,
    AppState,
};
use poem::listener::TcpListener;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config()?;
    let log_level = Level::from_str(&config.log_level).unwrap_or(Level::DEBUG);
    // Logging to File
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    // Logging to Console
    // tracing_subscriber::fmt().with_max_level(log_level).init();

    tracing::info!("run with config: {:?}", config);

    // Init Database Connection
    tracing::info!("Init SQLite connection on {}", config.database_url);
    let pool = init_pool(&config).await?;
    run_migrations(&pool).await?;
    let report = seed_defaults(&pool).await?;
    tracing::info!("seed result: {:?}", report);

    // Init App State
    let app_state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
    });

    let app = init_openapi_route(app_state.clone(), &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run(app)
    .await?;
    Ok(())
}
