use anyhow::Result;
use property_directory::{
    config::{DEFAULT_DATABASE_URL, DEFAULT_SITEMAP_PATH},
    db::Database,
    sitemap,
};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_sitemap=info".parse()?)
                .add_directive("property_directory=info".parse()?),
        )
        .init();

    // Only storage and output settings are needed here, so the detector URL is not required
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let output_path = PathBuf::from(
        std::env::var("SITEMAP_PATH").unwrap_or_else(|_| DEFAULT_SITEMAP_PATH.to_string()),
    );

    let db = Database::connect(&database_url).await?;
    let written = sitemap::write_sitemap(&db, &output_path).await?;

    info!("✓ {} generated successfully ({} locations)", output_path.display(), written);
    Ok(())
}
