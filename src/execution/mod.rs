//! Buy submission to the ledger.
//!
//! The controller only depends on `BuySubmitter`: "submit a buy, return a transaction
//! signature or a failure".

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub mod mock;
pub mod pump;

pub use mock::MockBuySubmitter;
pub use pump::{BuyTuning, PumpFunBuyer};

#[derive(Debug, Clone, PartialEq)]
pub struct BuyOrder {
    pub mint: Pubkey,
    pub bonding_curve: Pubkey,
    pub amount_sol: f64,
}

/// Confirmed buy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyFill {
    pub signature: String,
    /// Tokens received in UI units, when the submitter knows it.
    pub tokens_received: Option<f64>,
}

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("bonding curve unavailable: {0}")]
    Curve(String),
    #[error("buy of {amount_sol} SOL would receive zero tokens")]
    ZeroOutput { amount_sol: f64 },
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait BuySubmitter: Send + Sync {
    /// Build, sign, send and confirm a buy.
    async fn buy(&self, order: &BuyOrder) -> Result<BuyFill, SubmitError>;
}
