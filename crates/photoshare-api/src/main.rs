use photoshare_api::setup::{self, server};
use photoshare_core::Config;
use photoshare_services::{init_telemetry, LogFormat};

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_telemetry(LogFormat::detect())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, "Configuration loaded");

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    if server::running_in_lambda() {
        server::run_lambda(router).await?;
    } else {
        server::start_server(&config, router).await?;
    }

    Ok(())
}
