//! Composition root for the API server: config -> store -> repository
//! -> router -> listener.

use std::error::Error;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::repo::TodoRepo;
use crate::routes::router;
use crate::store::Store;

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ticklist=info,tower_http=info")),
        )
        .init();

    let store = Store::open(&config.database)?;
    let repo = TodoRepo::new(store);
    let app = router(repo);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        database = %config.database.display(),
        "ticklist API listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
