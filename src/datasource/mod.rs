//! Data source abstraction for reading ledger accounts and the SOL/USD rate.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::fmt;

pub mod coingecko;
pub mod mock;
pub mod solana;

pub use coingecko::{CoinGeckoOracle, DEFAULT_SOL_PRICE_URL, FALLBACK_SOL_PRICE_USD};
pub use mock::{FixedOracle, MockLedger};
pub use solana::SolanaRpcSource;

/// Read access to on-chain accounts.
///
/// Implementations do not retry; the monitor retries on its next tick.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetch the raw data of an account.
    ///
    /// # Returns
    /// The account data, or `FetchError::NotFound` if the account is missing or empty.
    async fn fetch_raw(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError>;

    /// Total amount of `mint` held by `owner` across its token accounts, in base units.
    ///
    /// An owner with no token account for the mint holds zero.
    async fn token_holding(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, FetchError>;
}

/// SOL/USD rate source.
///
/// Never fails: implementations fall back to a fixed rate when the feed is down.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn sol_usd(&self) -> f64;
}

/// Error type for ledger reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Account does not exist or has no data
    NotFound(String),
    /// Transport failure (connection refused, timeout, DNS)
    RpcUnavailable(String),
    /// Other RPC or response failure; retry on the next poll
    Transient(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound(addr) => write!(f, "Account not found: {}", addr),
            FetchError::RpcUnavailable(msg) => write!(f, "RPC unavailable: {}", msg),
            FetchError::Transient(msg) => write!(f, "RPC error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}
