pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod resource;
pub mod state;
pub mod storage;
pub mod uploads;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use state::AppState;
use uploads::UploadStorage;

pub async fn run() -> error::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("BLOGDESK_LOG"))
        .init();

    let config = Config::load()?;
    let pool = storage::new_db_poll(config.database_url()?).await?;

    tracing::info!(storage = %config.storage_root.display(), "storage root");

    let app = AppState::new(pool, UploadStorage::new(&config.storage_root));

    api::run_server(app, &config.listen).await
}
