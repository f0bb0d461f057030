//! SOL/USD rate from the CoinGecko simple-price API.

use super::PriceOracle;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SOL_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

/// Rate used whenever the feed cannot be read.
pub const FALLBACK_SOL_PRICE_USD: f64 = 150.0;

#[derive(Debug, Error)]
enum OracleError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected http status: {0}")]
    HttpStatus(u16),
    #[error("malformed body: {0}")]
    Body(String),
}

/// Best-effort price feed. Any failure degrades to the fallback rate.
#[derive(Debug, Clone)]
pub struct CoinGeckoOracle {
    client: Client,
    url: String,
    fallback: f64,
}

impl CoinGeckoOracle {
    /// Fails only if the HTTP client cannot be built (TLS backend unavailable).
    pub fn new(url: String, timeout: Duration, fallback: f64) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            fallback,
        })
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    async fn fetch(&self) -> Result<f64, OracleError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| OracleError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::HttpStatus(status.as_u16()));
        }

        let body = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| OracleError::Body(e.to_string()))?;

        match body.pointer("/solana/usd").and_then(|v| v.as_f64()) {
            Some(price) if price.is_finite() && price > 0.0 => Ok(price),
            Some(price) => Err(OracleError::Body(format!("non-positive price {}", price))),
            None => Err(OracleError::Body("missing solana.usd".to_string())),
        }
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn sol_usd(&self) -> f64 {
        match self.fetch().await {
            Ok(price) => {
                debug!("SOL/USD {}", price);
                price
            }
            Err(e) => {
                warn!("SOL price feed failed ({}), using fallback {}", e, self.fallback);
                self.fallback
            }
        }
    }
}
