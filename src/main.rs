use curve_sniper::orchestration::{BotController, BotDeps, Trader};
use curve_sniper::{
    api, config::Config, CoinGeckoOracle, CurveDecoder, PositionStore, PumpFunBuyer,
    SolanaRpcSource,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // A missing .env file is fine; the process environment is used as-is.
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;
    let decoder = CurveDecoder::new(config.curve_layout.clone());
    let ledger = Arc::new(SolanaRpcSource::from_url(config.rpc_url.clone()));
    let oracle = match CoinGeckoOracle::new(
        config.sol_price_url.clone(),
        config.sol_price_timeout,
        config.sol_price_fallback,
    ) {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            eprintln!("Failed to build price feed client: {}", e);
            std::process::exit(1);
        }
    };

    let trader = match config.wallet.clone() {
        Some(wallet) => {
            tracing::info!("Trading wallet: {}", wallet.pubkey());
            let buyer = PumpFunBuyer::new(
                ledger.client(),
                wallet.clone(),
                decoder.clone(),
                config.buy_tuning,
            );
            Some(Trader {
                wallet,
                buyer: Arc::new(buyer),
            })
        }
        None => {
            tracing::warn!("PRIVATE_KEY not set; buying is disabled");
            None
        }
    };

    let controller = Arc::new(BotController::new(BotDeps {
        ledger,
        oracle,
        store: PositionStore::new(&config.position_file),
        decoder,
        trader,
        poll_interval: config.poll_interval,
        stop_timeout: config.stop_timeout,
    }));

    if controller.resume().await {
        tracing::info!("Resumed monitoring of persisted position");
    }

    let app = api::create_router(api::AppState::new(controller));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
