use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{schema, DatabaseManager};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    manager.migrate().await.context("failed to apply schema")?;
    manager.close().await;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "migrated": true, "statements": schema::STATEMENTS.len() })),
        OutputFormat::Text => println!("Schema applied ({} statements)", schema::STATEMENTS.len()),
    }
    Ok(())
}
