//! Status view handed to API consumers.

use super::position::Position;
use serde::{Deserialize, Serialize};

/// Coarse bot state shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotStatus {
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "active sniping")]
    ActiveSniping,
    #[serde(rename = "stopped")]
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub active: bool,
    pub entry_price: String,
    pub current_price: String,
    pub price_change_percent: f64,
    pub pnl_usd: f64,
    pub pnl_percent: f64,
    pub position_size: f64,
    pub position_value: f64,
    pub tp_target: String,
    pub sl_target: String,
    pub tp_progress: f64,
    pub bonding_curve_sol: f64,
    pub market_cap: String,
    pub status: BotStatus,
    pub manual_sell_detected: bool,
}

impl StatusView {
    /// View returned when no position exists.
    pub fn ready() -> Self {
        StatusView {
            active: false,
            entry_price: format_usd_price(0.0),
            current_price: format_usd_price(0.0),
            price_change_percent: 0.0,
            pnl_usd: 0.0,
            pnl_percent: 0.0,
            position_size: 0.0,
            position_value: 0.0,
            tp_target: format_usd_price(0.0),
            sl_target: format_usd_price(0.0),
            tp_progress: 0.0,
            bonding_curve_sol: 0.0,
            market_cap: "$0".to_string(),
            status: BotStatus::Ready,
            manual_sell_detected: false,
        }
    }

    pub fn from_position(position: &Position, active: bool) -> Self {
        StatusView {
            active,
            entry_price: format_usd_price(position.entry_price_usd),
            current_price: format_usd_price(position.current_price_usd),
            price_change_percent: position.pnl_percent,
            pnl_usd: position.pnl_usd,
            pnl_percent: position.pnl_percent,
            position_size: position.position_size,
            position_value: position.position_value_usd,
            tp_target: format_usd_price(position.tp_target_usd),
            sl_target: format_usd_price(position.sl_target_usd),
            tp_progress: position.tp_progress,
            bonding_curve_sol: position.bonding_curve_sol,
            market_cap: format_market_cap(position.market_cap_estimate()),
            status: if active {
                BotStatus::ActiveSniping
            } else {
                BotStatus::Stopped
            },
            manual_sell_detected: position.manual_sell_detected,
        }
    }
}

/// Dollar price with eight decimals, e.g. `$0.00000450`.
pub fn format_usd_price(value: f64) -> String {
    format!("${:.8}", value)
}

/// Abbreviate a dollar amount with a B/M/K suffix.
pub fn format_market_cap(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}
