//! The single open trade tracked by the bot.

use super::protocol::bonding_curve_address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Persisted position record.
///
/// Entry fields are written once when the buy confirms. Mark fields are rewritten by the
/// monitor on every successful tick. Prices are raw floats; formatting happens only in
/// the status view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(with = "pubkey_string")]
    pub token_address: Pubkey,

    // Entry facts.
    pub buy_amount_sol: f64,
    pub entry_price_sol: f64,
    pub entry_price_usd: f64,
    /// Tokens received by the buy, in UI units.
    pub position_size: f64,
    pub take_profit_percent: f64,
    pub stop_loss_percent: f64,
    pub tp_target_usd: f64,
    pub sl_target_usd: f64,
    pub tx_signature: String,
    pub start_time: DateTime<Utc>,

    // Marks.
    pub current_price_sol: f64,
    pub current_price_usd: f64,
    /// Virtual SOL reserves of the curve at the last mark.
    pub bonding_curve_sol: f64,
    pub pnl_usd: f64,
    pub pnl_percent: f64,
    pub position_value_usd: f64,
    pub tp_progress: f64,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub manual_sell_detected: bool,
}

impl Position {
    /// Bonding-curve account of the traded mint. Derived, never stored.
    pub fn bonding_curve(&self) -> Pubkey {
        bonding_curve_address(&self.token_address)
    }

    /// Crude display estimate; not a supply-based market cap.
    pub fn market_cap_estimate(&self) -> f64 {
        self.position_size * self.current_price_usd * 1000.0
    }
}

mod pubkey_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pubkey::from_str(&raw).map_err(serde::de::Error::custom)
    }
}
