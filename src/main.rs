use surplus_market::prelude::*;

/// Usage: `surplus-market [config.yaml]`
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("surplus_market=info,tower_http=info")?;

    let config = match std::env::args().nth(1) {
        Some(path) => MarketConfig::from_yaml_file(&path)?,
        None => MarketConfig::default(),
    };
    let addr = config.bind_address.clone();

    tracing::info!(
        forecast = %config.forecast.base_url,
        seed_fixtures = config.seed_fixtures,
        "starting marketplace"
    );

    ServerBuilder::new().with_config(config).serve(&addr).await
}
