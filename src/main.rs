use std::net::TcpListener;

use anyhow::Context;
use blogdesk::{config::Config, init_db, logging, make_router, run_app, seed_admin, state::AppState};

async fn start() -> blogdesk::Result<()> {
    let config = Config::from_env()?;
    let pool = init_db(&config.database_url).await?;
    if let Some(admin) = &config.admin {
        seed_admin(&pool, admin).await?;
    }

    let address = config.address()?;
    let listener =
        TcpListener::bind(address).with_context(|| format!("Could not bind to {address}"))?;
    let router = make_router(AppState::new(pool, config));
    run_app(router, listener).await
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();
    if let Err(error) = start().await {
        tracing::error!(error = ?error, "server exited");
        std::process::exit(1);
    }
}
