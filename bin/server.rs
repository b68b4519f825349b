// Pocket Ledger - Web Server

use anyhow::{Context, Result};
use pocket_ledger::{
    config::Config,
    logging,
    web::{router, AppState},
    LedgerStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();
    let config = Config::from_env()?;

    let store = LedgerStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    tracing::info!(addr = %config.listen_addr, "pocket ledger listening");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
