use club_ledger::{
    config::{database, seed},
    core::report,
    errors::Result,
    store,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load the seed configuration
    let config = seed::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database ready at {}", database::get_database_url());

    // 5. Seed an empty store with the administrator account
    if store::seed_if_empty(&db, &config.admin).await? {
        info!("Initialized empty store with admin {}", config.admin.email);
    }

    // 6. Report the current state
    let stats = report::load_application_stats(&db).await?;
    for line in report::format_stats_summary(&stats).lines() {
        info!("{}", line);
    }

    Ok(())
}
