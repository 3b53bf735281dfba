// src/main.rs
use std::sync::Arc;

use poll_service::{
    build_app,
    config::Config,
    db::{self, PgStore},
    init_tracing, serve,
    store::{MemoryStore, PollStore},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok(); // Load environment variables from .env file
    init_tracing();

    let config = Config::from_env()?;

    let store: Arc<dyn PollStore> = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url, config.max_connections).await?;
            info!("Connected to Postgres");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, polls are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let port = config.port;
    serve(build_app(store, config), port).await?;

    Ok(())
}
