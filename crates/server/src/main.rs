//! Mock discount REST API over PostgreSQL.

mod api;
mod db;
mod error;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use descontos_core::Config;

use crate::db::PgDescontoStore;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "descontos-api", about = "Mock discount API backed by PostgreSQL")]
struct Cli {
    /// Apply the bundled migrations (schema and demo rows) before serving.
    #[arg(long)]
    migrate: bool,

    /// Address to listen on (overrides API_HOST/API_PORT).
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    descontos_core::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let store = PgDescontoStore::new(&config.postgres);
    if cli.migrate {
        store.migrate().await.context("failed to apply migrations")?;
    }

    let app = router::build_router(Arc::new(AppState {
        store: Arc::new(store),
    }));

    let addr = cli.bind.unwrap_or_else(|| config.api.bind_addr());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
