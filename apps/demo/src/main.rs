mod main_lib;

use breadbox_domain::HubConfig;
use main_lib::{init_tracing, DemoState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = HubConfig::from_env();
    tracing::info!("Storage directory: {}", config.storage_dir.display());

    let state = DemoState::build(config)?;
    state.run().await
}
