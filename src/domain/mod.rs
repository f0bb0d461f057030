//! Domain types for the bonding-curve sniper.
//!
//! This module provides:
//! - Pump.fun protocol constants and address derivation
//! - The persisted `Position` record
//! - The status view returned to API consumers
//! - A signing wallet wrapper that never prints its secret

pub mod position;
pub mod protocol;
pub mod status;
pub mod wallet;

pub use position::Position;
pub use protocol::{bonding_curve_address, STOP_LOSS_PERCENT};
pub use status::{format_market_cap, format_usd_price, BotStatus, StatusView};
pub use wallet::{Wallet, WalletError};
