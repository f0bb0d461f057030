//! Background task that marks the open position to market.
//!
//! One tick:
//! 1. exit if the session is inactive (or this monitor was superseded);
//! 2. wait if no position is loaded yet;
//! 3. if the wallet no longer holds the token, flag a manual sell, persist and stop;
//! 4. otherwise quote the curve, revalue the position and persist it.
//!
//! A failed tick is logged and retried after the poll interval. Only an explicit stop or
//! a manual sell ends the loop.

use super::{quote_curve, PriceError, Session, SharedSession};
use crate::datasource::{FetchError, LedgerSource, PriceOracle};
use crate::engine::{mark_position, CurveDecoder};
use crate::store::{PositionStore, StoreError};
use chrono::Utc;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Everything a monitor needs, shared with the controller.
#[derive(Clone)]
pub struct MonitorContext {
    pub session: SharedSession,
    pub store: Arc<PositionStore>,
    pub ledger: Arc<dyn LedgerSource>,
    pub oracle: Arc<dyn PriceOracle>,
    pub decoder: CurveDecoder,
    /// Wallet checked for manual sells. `None` disables the check.
    pub owner: Option<Pubkey>,
    pub poll_interval: Duration,
    /// Cuts the sleep between ticks short after a stop request.
    pub wake: Arc<Notify>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session inactive or monitor superseded; the loop ends.
    Inactive,
    /// Active but no position loaded yet.
    Waiting,
    /// Wallet emptied outside the bot; the session was stopped.
    ManualSell,
    /// Curve could not be priced this tick.
    NoPrice,
    Updated,
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct PositionMonitor {
    ctx: MonitorContext,
    run_id: u64,
}

impl PositionMonitor {
    pub fn new(ctx: MonitorContext, run_id: u64) -> Self {
        Self { ctx, run_id }
    }

    pub async fn run(self) {
        info!("Position monitor {} started", self.run_id);

        loop {
            match self.tick().await {
                Ok(TickOutcome::Inactive) | Ok(TickOutcome::ManualSell) => break,
                Ok(TickOutcome::Waiting) => debug!("No position loaded yet"),
                Ok(_) => {}
                Err(e) => warn!("Monitor tick failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.ctx.poll_interval) => {}
                _ = self.ctx.wake.notified() => {}
            }
        }

        info!("Position monitor {} stopped", self.run_id);
    }

    pub async fn tick(&self) -> Result<TickOutcome, MonitorError> {
        let position = {
            let session = self.ctx.session.lock().await;
            if !session.active || session.run_id != self.run_id {
                return Ok(TickOutcome::Inactive);
            }
            match &session.position {
                Some(position) => position.clone(),
                None => return Ok(TickOutcome::Waiting),
            }
        };

        // Takes priority over the price update.
        if let Some(owner) = self.ctx.owner {
            let held = self
                .ctx
                .ledger
                .token_holding(&owner, &position.token_address)
                .await?;
            if held == 0 && position.position_size > 0.0 {
                let mut session = self.ctx.session.lock().await;
                if !self.owns(&session, &position.token_address) {
                    return Ok(TickOutcome::Inactive);
                }
                warn!(
                    "Manual sell detected: wallet {} no longer holds {}. Stopping bot",
                    owner, position.token_address
                );
                if let Some(current) = session.position.as_mut() {
                    current.manual_sell_detected = true;
                    if let Err(e) = self.ctx.store.save(current) {
                        error!("Failed to persist manual sell flag: {}", e);
                    }
                }
                session.active = false;
                return Ok(TickOutcome::ManualSell);
            }
        }

        let quote = match quote_curve(
            self.ctx.ledger.as_ref(),
            &self.ctx.decoder,
            &position.bonding_curve(),
        )
        .await
        {
            Ok(quote) => quote,
            Err(PriceError::Fetch(e)) => return Err(e.into()),
            Err(e) => {
                debug!("No fresh price for {}: {}", position.token_address, e);
                return Ok(TickOutcome::NoPrice);
            }
        };
        let sol_usd = self.ctx.oracle.sol_usd().await;

        let mut session = self.ctx.session.lock().await;
        if !self.owns(&session, &position.token_address) {
            return Ok(TickOutcome::Inactive);
        }
        let Some(current) = session.position.as_mut() else {
            return Ok(TickOutcome::Waiting);
        };

        mark_position(current, &quote, sol_usd, Utc::now());
        info!(
            "Price: ${:.10} | P&L: {:+.2}% | Progress: {:.1}%",
            current.current_price_usd, current.pnl_percent, current.tp_progress
        );

        self.ctx.store.save(current)?;
        Ok(TickOutcome::Updated)
    }

    /// Whether this monitor may still write to the session's position for `mint`.
    ///
    /// Re-checked after every await: a stop, restart or new position may have happened
    /// in between.
    fn owns(&self, session: &Session, mint: &Pubkey) -> bool {
        session.active
            && session.run_id == self.run_id
            && session
                .position
                .as_ref()
                .is_some_and(|p| p.token_address == *mint)
    }
}
