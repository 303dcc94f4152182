use dotenvy::dotenv;
use stock_ledger::{
    config::{catalog, database},
    core::{product, report},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed the catalog on first run
    match catalog::load_default_config() {
        Ok(catalog) => {
            let created = product::seed_catalog(&db, &catalog)
                .await
                .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
            info!("Catalog seed created {} SKUs", created);
        }
        Err(e) => warn!("No catalog loaded: {}", e),
    }

    // 5. Report SKUs at or below their warning level
    let low = report::low_stock_skus(&db).await?;
    if low.is_empty() {
        info!("All SKUs are above their stock warning level");
    }
    for entry in &low {
        warn!("{}", report::format_stock_line(entry));
    }

    Ok(())
}
