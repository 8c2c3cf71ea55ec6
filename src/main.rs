// region:    --- Imports
use marketplace_admin::config::Config;
use marketplace_admin::database::DatabaseManager;
use marketplace_admin::handlers;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    // database handle (store + retry layer)
    let db_manager = match DatabaseManager::connect(&config).await {
        Ok(db_manager) => Arc::new(db_manager),
        Err(e) => {
            error!("{:<12} --> database connection failed: {:?}", "Main", e);
            return Err(e.into());
        }
    };
    info!(
        "{:<12} --> database ready (retry policy: {:?})",
        "Main",
        db_manager.retry_policy()
    );

    let routes_all = handlers::routes(db_manager);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
