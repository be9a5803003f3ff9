use anyhow::Context;
use aura_chat::api::BackendClient;
use aura_chat::config::initialize_config;
use aura_chat::logging::initialize_logging;
use aura_chat::ui::run_ui;
use aura_chat::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    initialize_config().context("failed to initialize configuration")?;
    let _logger = initialize_logging().context("failed to initialize logging")?;

    let client = BackendClient::from_config();
    log::info!("aura-chat starting against {}", client.base_url());

    let app = App::new(client);
    run_ui(app)
        .await
        .map_err(|e| anyhow::anyhow!("UI loop failed: {}", e))?;

    Ok(())
}
