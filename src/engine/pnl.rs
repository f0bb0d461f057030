//! Mark-to-market arithmetic for the open position.

use super::curve::CurveQuote;
use crate::domain::Position;
use chrono::{DateTime, Utc};

/// Result of valuing a position at a fresh price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub current_price_usd: f64,
    pub pnl_percent: f64,
    pub position_value_usd: f64,
    pub pnl_usd: f64,
    pub tp_progress: f64,
}

/// Take-profit and stop-loss prices in USD for an entry price.
pub fn price_targets(
    entry_price_usd: f64,
    take_profit_percent: f64,
    stop_loss_percent: f64,
) -> (f64, f64) {
    (
        entry_price_usd * (1.0 + take_profit_percent / 100.0),
        entry_price_usd * (1.0 + stop_loss_percent / 100.0),
    )
}

/// Share of the take-profit distance covered, clamped to `0..=100`.
pub fn tp_progress(pnl_percent: f64, take_profit_percent: f64) -> f64 {
    if take_profit_percent > 0.0 {
        (pnl_percent / take_profit_percent * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn value_position(position: &Position, price_sol: f64, sol_usd: f64) -> Valuation {
    let current_price_usd = price_sol * sol_usd;
    let pnl_percent = if position.entry_price_usd > 0.0 {
        (current_price_usd - position.entry_price_usd) / position.entry_price_usd * 100.0
    } else {
        0.0
    };
    let position_value_usd = position.position_size * current_price_usd;
    let pnl_usd = position_value_usd - position.buy_amount_sol * sol_usd;

    Valuation {
        current_price_usd,
        pnl_percent,
        position_value_usd,
        pnl_usd,
        tp_progress: tp_progress(pnl_percent, position.take_profit_percent),
    }
}

/// Apply a curve quote to the position's mark fields.
pub fn mark_position(position: &mut Position, quote: &CurveQuote, sol_usd: f64, at: DateTime<Utc>) {
    let valuation = value_position(position, quote.price_sol, sol_usd);
    position.current_price_sol = quote.price_sol;
    position.current_price_usd = valuation.current_price_usd;
    position.bonding_curve_sol = quote.sol_reserves;
    position.pnl_percent = valuation.pnl_percent;
    position.position_value_usd = valuation.position_value_usd;
    position.pnl_usd = valuation.pnl_usd;
    position.tp_progress = valuation.tp_progress;
    position.last_update = at;
}
