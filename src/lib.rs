pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod execution;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use datasource::{
    CoinGeckoOracle, FetchError, LedgerSource, MockLedger, PriceOracle, SolanaRpcSource,
};
pub use domain::{Position, StatusView, Wallet};
pub use engine::{CurveDecoder, CurveLayout, DecodeError};
pub use error::AppError;
pub use execution::{BuySubmitter, MockBuySubmitter, PumpFunBuyer};
pub use orchestration::{BotController, BotDeps, StartError, Trader};
pub use store::{PositionStore, StoreError};
