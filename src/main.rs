use std::path::PathBuf;
use std::sync::Arc;

use menu_seeder::config::AppConfig;
use menu_seeder::logic::{AssetIngestor, SeedOrchestrator};
use menu_seeder::seed;
use menu_seeder::store::AppwriteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with INFO level only (suppress DEBUG logs)
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new().filter_level(LevelFilter::Info).init();

    println!("menu-seeder: remote store reset and repopulation");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: project={} database={} bucket={}",
        config.appwrite.project_id, config.appwrite.database_id, config.appwrite.bucket_id
    );

    let store = Arc::new(AppwriteStore::new(config.appwrite.clone())?);
    let ingestor = Arc::new(AssetIngestor::new(
        store.clone(),
        config.seeder.staging_dir.as_ref().map(PathBuf::from),
    )?);

    let orchestrator = SeedOrchestrator::new(
        store.clone(),
        store,
        ingestor,
        config.appwrite.tables.clone(),
        config.seeder.max_concurrency,
    );

    let summary = orchestrator.run(&seed::dataset()).await?;
    println!(
        "Seeding complete: {} categories, {} customisations, {} menu items, {} links ({} rows and {} blobs cleared first)",
        summary.categories,
        summary.customisations,
        summary.menu_items,
        summary.links,
        summary.cleared_rows,
        summary.cleared_blobs
    );

    Ok(())
}
