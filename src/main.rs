use anyhow::Result;
use property_directory::{
    api::{self, AppState},
    config::Config,
    db::Database,
    i18n::{HttpLanguageDetector, LocalizationValidator},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("property_directory=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting property directory");

    // Load configuration from environment
    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;

    if let Some((username, email, password)) = config.bootstrap_admin() {
        if db.ensure_superuser(username, email, password).await? {
            info!("Created superuser '{}'", username);
        }
    }

    let detector = HttpLanguageDetector::new(
        &config.langdetect_api_url,
        config.langdetect_api_key.clone(),
        config.langdetect_min_confidence,
    );
    let state = Arc::new(AppState {
        db,
        validator: LocalizationValidator::new(Arc::new(detector)),
    });

    api::start_server(state, config.port).await
}
