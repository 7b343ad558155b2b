use jar_ledger::{
    config::{app, database, seed},
    errors::Result,
    scheduler::ReportScheduler,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let config = app::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and create the schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the owner and jars on first run
    let owner = seed::seed_from_config(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed from configuration: {}", e))?;
    info!(user_id = owner.id, "Ledger ready for {}", owner.name);

    // 6. Start the monthly report scheduler
    let db = Arc::new(db);
    let scheduler_task = if config.scheduler.enabled {
        Some(ReportScheduler::new(Arc::clone(&db), owner.id, config.scheduler).start())
    } else {
        info!("Report scheduler disabled in configuration.");
        None
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down.");
    if let Some(task) = scheduler_task {
        task.abort();
    }
    Ok(())
}
