use super::monitor::{MonitorContext, PositionMonitor};
use super::{quote_curve, PriceError, Session};
use crate::datasource::{LedgerSource, PriceOracle};
use crate::domain::{bonding_curve_address, Position, StatusView, Wallet, STOP_LOSS_PERCENT};
use crate::engine::{price_targets, CurveDecoder};
use crate::execution::{BuyOrder, BuySubmitter};
use crate::store::{PositionStore, StoreError};
use chrono::Utc;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Signing wallet and the submitter that spends from it.
#[derive(Clone)]
pub struct Trader {
    pub wallet: Wallet,
    pub buyer: Arc<dyn BuySubmitter>,
}

pub struct BotDeps {
    pub ledger: Arc<dyn LedgerSource>,
    pub oracle: Arc<dyn PriceOracle>,
    pub store: PositionStore,
    pub decoder: CurveDecoder,
    /// `None` when no private key is configured; `start` is then refused.
    pub trader: Option<Trader>,
    pub poll_interval: Duration,
    pub stop_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyReceipt {
    pub tx_signature: String,
    pub tokens_received: f64,
    pub entry_price_usd: f64,
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("Private key not configured")]
    NoWallet,
    #[error("Bot already running")]
    AlreadyActive,
    #[error("Could not fetch token price: {0}")]
    PriceUnavailable(#[source] PriceError),
    #[error("Buy failed: {0}")]
    BuySubmissionFailed(String),
    /// The buy confirmed on-chain but no local record could be written.
    #[error("Buy {signature} confirmed but the position could not be saved: {source}")]
    PositionNotSaved {
        signature: String,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum ClearError {
    #[error("Bot is active; stop it before clearing the position")]
    Active,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the session and the monitor task.
pub struct BotController {
    ctx: MonitorContext,
    trader: Option<Trader>,
    stop_timeout: Duration,
    monitor: Mutex<Option<JoinHandle<()>>>,
    /// Serializes `start` so two concurrent requests cannot both buy.
    start_lock: Mutex<()>,
}

impl BotController {
    pub fn new(deps: BotDeps) -> Self {
        let ctx = MonitorContext {
            session: Arc::new(Mutex::new(Session::default())),
            store: Arc::new(deps.store),
            ledger: deps.ledger,
            oracle: deps.oracle,
            decoder: deps.decoder,
            owner: deps.trader.as_ref().map(|t| t.wallet.pubkey()),
            poll_interval: deps.poll_interval,
            wake: Arc::new(Notify::new()),
        };

        Self {
            ctx,
            trader: deps.trader,
            stop_timeout: deps.stop_timeout,
            monitor: Mutex::new(None),
            start_lock: Mutex::new(()),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.ctx.session.lock().await.active
    }

    /// Load the persisted position and resume monitoring it.
    ///
    /// A record already flagged as manually sold is loaded for display but not resumed.
    /// Returns whether monitoring was resumed.
    pub async fn resume(&self) -> bool {
        let Some(position) = self.ctx.store.load() else {
            return false;
        };

        let resume = !position.manual_sell_detected;
        info!(
            "Loaded existing position for {} (opened {})",
            position.token_address, position.start_time
        );
        {
            let mut session = self.ctx.session.lock().await;
            session.position = Some(position);
            session.active = resume;
        }

        if resume {
            self.spawn_monitor().await;
        } else {
            info!("Position was sold outside the bot; not resuming");
        }
        resume
    }

    pub async fn start(
        &self,
        token_address: Pubkey,
        buy_amount_sol: f64,
        take_profit_percent: f64,
    ) -> Result<BuyReceipt, StartError> {
        let trader = self.trader.as_ref().ok_or(StartError::NoWallet)?;
        let _guard = self.start_lock.lock().await;
        if self.ctx.session.lock().await.active {
            return Err(StartError::AlreadyActive);
        }

        info!(
            "Starting sniper: token={} amount={} SOL take_profit=+{}%",
            token_address, buy_amount_sol, take_profit_percent
        );

        let bonding_curve = bonding_curve_address(&token_address);
        let quote = quote_curve(self.ctx.ledger.as_ref(), &self.ctx.decoder, &bonding_curve)
            .await
            .map_err(|e| {
                warn!("No entry price for {}: {}", token_address, e);
                StartError::PriceUnavailable(e)
            })?;
        let sol_usd = self.ctx.oracle.sol_usd().await;
        let entry_price_usd = quote.price_sol * sol_usd;
        debug!(
            "Entry quote: {:.12} SOL (${:.10}), curve holds {:.4} SOL",
            quote.price_sol, entry_price_usd, quote.sol_reserves
        );

        let fill = trader
            .buyer
            .buy(&BuyOrder {
                mint: token_address,
                bonding_curve,
                amount_sol: buy_amount_sol,
            })
            .await
            .map_err(|e| {
                warn!("Buy of {} failed: {}", token_address, e);
                StartError::BuySubmissionFailed(e.to_string())
            })?;
        let tokens_received = fill
            .tokens_received
            .unwrap_or(buy_amount_sol / quote.price_sol);
        info!(
            "Buy confirmed: {} ({} tokens)",
            fill.signature, tokens_received
        );

        let (tp_target_usd, sl_target_usd) =
            price_targets(entry_price_usd, take_profit_percent, STOP_LOSS_PERCENT);
        let now = Utc::now();
        let position = Position {
            token_address,
            buy_amount_sol,
            entry_price_sol: quote.price_sol,
            entry_price_usd,
            position_size: tokens_received,
            take_profit_percent,
            stop_loss_percent: STOP_LOSS_PERCENT,
            tp_target_usd,
            sl_target_usd,
            tx_signature: fill.signature.clone(),
            start_time: now,
            current_price_sol: quote.price_sol,
            current_price_usd: entry_price_usd,
            bonding_curve_sol: quote.sol_reserves,
            pnl_usd: 0.0,
            pnl_percent: 0.0,
            position_value_usd: tokens_received * entry_price_usd,
            tp_progress: 0.0,
            last_update: now,
            manual_sell_detected: false,
        };

        // Tokens are already bought: monitor the position even if it cannot be saved.
        let saved = self.ctx.store.save(&position);
        {
            let mut session = self.ctx.session.lock().await;
            session.position = Some(position);
            session.active = true;
        }
        self.spawn_monitor().await;

        if let Err(source) = saved {
            error!(
                "CRITICAL: buy {} for {} confirmed but position was not saved to {}: {}",
                fill.signature,
                token_address,
                self.ctx.store.path().display(),
                source
            );
            return Err(StartError::PositionNotSaved {
                signature: fill.signature,
                source,
            });
        }

        Ok(BuyReceipt {
            tx_signature: fill.signature,
            tokens_received,
            entry_price_usd,
        })
    }

    /// Deactivate and wait (bounded) for the monitor to exit. The position is kept.
    pub async fn stop(&self) {
        self.ctx.session.lock().await.active = false;
        self.ctx.wake.notify_one();

        let handle = self.monitor.lock().await.take();
        if let Some(handle) = handle {
            match tokio::time::timeout(self.stop_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Monitor task ended abnormally: {}", e),
                Err(_) => warn!(
                    "Monitor did not exit within {:?}; it stops at its next tick",
                    self.stop_timeout
                ),
            }
        }
        info!("Bot stopped");
    }

    pub async fn status(&self) -> StatusView {
        let session = self.ctx.session.lock().await;
        match &session.position {
            Some(position) => StatusView::from_position(position, session.active),
            None => StatusView::ready(),
        }
    }

    /// Forget a stopped position, in memory and on disk.
    pub async fn clear_position(&self) -> Result<(), ClearError> {
        let mut session = self.ctx.session.lock().await;
        if session.active {
            return Err(ClearError::Active);
        }
        self.ctx.store.delete()?;
        if let Some(position) = session.position.take() {
            info!("Cleared position for {}", position.token_address);
        }
        Ok(())
    }

    /// No-op while a monitor is alive.
    async fn spawn_monitor(&self) {
        let mut slot = self.monitor.lock().await;
        if let Some(handle) = slot.as_ref() {
            if !handle.is_finished() {
                debug!("Monitor already running");
                return;
            }
        }

        // Any monitor left over from a stop that timed out sees the new id and exits.
        let run_id = {
            let mut session = self.ctx.session.lock().await;
            session.run_id += 1;
            session.run_id
        };
        let monitor = PositionMonitor::new(self.ctx.clone(), run_id);
        *slot = Some(tokio::spawn(monitor.run()));
    }
}
