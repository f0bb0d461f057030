//! Position lifecycle: the controller that opens positions and the monitor task that
//! marks them.

pub mod controller;
pub mod monitor;

pub use controller::{BotController, BotDeps, BuyReceipt, ClearError, StartError, Trader};
pub use monitor::{MonitorContext, MonitorError, PositionMonitor, TickOutcome};

use crate::datasource::{FetchError, LedgerSource};
use crate::domain::Position;
use crate::engine::{CurveDecoder, CurveQuote, DecodeError};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// State shared by the controller and the monitor task.
#[derive(Debug, Default)]
pub struct Session {
    pub active: bool,
    pub position: Option<Position>,
    /// Id of the monitor allowed to run. A monitor whose id no longer matches exits.
    pub run_id: u64,
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Why a curve could not be priced.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("bonding curve reports a zero price")]
    ZeroPrice,
}

/// Fetch and decode a bonding curve into a usable (positive) price.
pub async fn quote_curve(
    ledger: &dyn LedgerSource,
    decoder: &CurveDecoder,
    bonding_curve: &Pubkey,
) -> Result<CurveQuote, PriceError> {
    let data = ledger.fetch_raw(bonding_curve).await?;
    let quote = decoder.decode(&data)?;
    if !quote.price_sol.is_finite() || quote.price_sol <= 0.0 {
        return Err(PriceError::ZeroPrice);
    }
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockLedger;
    use crate::engine::CurveLayout;

    fn curve_blob(token_raw: u64, sol_raw: u64) -> Vec<u8> {
        let layout = CurveLayout::pump_fun();
        let mut data = vec![0u8; 49];
        data[..8].copy_from_slice(&layout.discriminator.unwrap());
        data[8..16].copy_from_slice(&token_raw.to_le_bytes());
        data[16..24].copy_from_slice(&sol_raw.to_le_bytes());
        data
    }

    #[tokio::test]
    async fn test_quote_curve_ok() {
        let curve = Pubkey::new_unique();
        let ledger =
            MockLedger::new().with_account(curve, curve_blob(1_000_000_000, 1_000_000_000));
        let quote = quote_curve(&ledger, &CurveDecoder::default(), &curve)
            .await
            .unwrap();
        assert!((quote.price_sol - 1.0 / 1_000.0).abs() < 1e-15);
    }

    #[tokio::test]
    async fn test_quote_curve_zero_sol_reserves() {
        let curve = Pubkey::new_unique();
        let ledger = MockLedger::new().with_account(curve, curve_blob(1_000_000_000, 0));
        let result = quote_curve(&ledger, &CurveDecoder::default(), &curve).await;
        assert!(matches!(result, Err(PriceError::ZeroPrice)));
    }

    #[tokio::test]
    async fn test_quote_curve_missing_account() {
        let ledger = MockLedger::new();
        let result =
            quote_curve(&ledger, &CurveDecoder::default(), &Pubkey::new_unique()).await;
        assert!(matches!(
            result,
            Err(PriceError::Fetch(FetchError::NotFound(_)))
        ));
    }
}
