// src/main.rs
use order_packer::api;
use order_packer::config::AppConfig;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            log::warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let packer = match app_config.catalog.build_packer() {
        Ok(packer) => packer,
        Err(err) => {
            log::error!("❌ Invalid container catalog: {}", err);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Order packing service starting...");
    api::start_api_server(app_config.api, packer).await;
}
