use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tracing::warn;

use crate::app::{self, AppState};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides SERVER_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port (overrides SERVER_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Use the in-process store instead of PostgreSQL; data is lost on exit")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.memory {
        warn!("Serving from the in-memory store; nothing will be persisted");
        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        app::serve(state).await?;
        return Ok(());
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    manager.migrate().await.context("failed to apply schema")?;

    let state = AppState::new(config, Arc::new(PgStore::new(manager.clone())))?;
    let result = app::serve(state).await;
    manager.close().await;
    Ok(result?)
}
