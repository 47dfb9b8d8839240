// src/main.rs
use env_logger::Builder;
use log::{info, LevelFilter};
use portfolio_valuation::api;
use portfolio_valuation::quotes::NseClient;
use std::env;
use std::sync::Arc;

struct ServerConfig {
    port: u16,
    provider_base_url: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3030);
        let provider_base_url =
            env::var("NSE_BASE_URL").unwrap_or_else(|_| "https://www.nseindia.com".to_string());
        ServerConfig {
            port,
            provider_base_url,
        }
    }
}

#[tokio::main]
async fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    let config = ServerConfig::from_env();
    info!("Starting the portfolio valuation service...");

    let gateway = Arc::new(NseClient::new(config.provider_base_url));
    let api = api::routes(gateway);

    info!("Server running on http://127.0.0.1:{}", config.port);
    warp::serve(api).run(([127, 0, 0, 1], config.port)).await;
}
