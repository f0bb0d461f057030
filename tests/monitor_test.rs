use chrono::Utc;
use curve_sniper::datasource::{
    CoinGeckoOracle, FetchError, FixedOracle, LedgerSource, MockLedger, PriceOracle,
};
use curve_sniper::domain::Position;
use curve_sniper::engine::{CurveDecoder, CurveLayout};
use curve_sniper::orchestration::{
    MonitorContext, PositionMonitor, Session, SharedSession, TickOutcome,
};
use curve_sniper::store::PositionStore;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{Mutex, Notify};

struct Harness {
    ctx: MonitorContext,
    ledger: Arc<MockLedger>,
    store: Arc<PositionStore>,
    _temp: TempDir,
}

fn curve_blob(token_raw: u64, sol_raw: u64) -> Vec<u8> {
    let mut data = vec![0u8; 49];
    data[..8].copy_from_slice(&CurveLayout::pump_fun().discriminator.unwrap());
    data[8..16].copy_from_slice(&token_raw.to_le_bytes());
    data[16..24].copy_from_slice(&sol_raw.to_le_bytes());
    data
}

/// 100 tokens bought at 0.00003 SOL ($0.006 at $200/SOL), take profit +50%.
fn position(size: f64) -> Position {
    let now = Utc::now();
    Position {
        token_address: Pubkey::new_unique(),
        buy_amount_sol: 0.003,
        entry_price_sol: 0.000_03,
        entry_price_usd: 0.006,
        position_size: size,
        take_profit_percent: 50.0,
        stop_loss_percent: -20.0,
        tp_target_usd: 0.009,
        sl_target_usd: 0.0048,
        tx_signature: "5xSig".to_string(),
        start_time: now,
        current_price_sol: 0.000_03,
        current_price_usd: 0.006,
        bonding_curve_sol: 30.0,
        pnl_usd: 0.0,
        pnl_percent: 0.0,
        position_value_usd: size * 0.006,
        tp_progress: 0.0,
        last_update: now,
        manual_sell_detected: false,
    }
}

fn harness(
    position: Option<Position>,
    ledger: MockLedger,
    oracle: Arc<dyn PriceOracle>,
    owner: Option<Pubkey>,
) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(PositionStore::new(temp_dir.path().join("position.json")));
    let ledger = Arc::new(ledger);
    let session: SharedSession = Arc::new(Mutex::new(Session {
        active: true,
        position,
        run_id: 0,
    }));

    let ctx = MonitorContext {
        session,
        store: store.clone(),
        ledger: ledger.clone() as Arc<dyn LedgerSource>,
        oracle,
        decoder: CurveDecoder::default(),
        owner,
        poll_interval: Duration::from_millis(10),
        wake: Arc::new(Notify::new()),
    };

    Harness {
        ctx,
        ledger,
        store,
        _temp: temp_dir,
    }
}

async fn current(h: &Harness) -> (bool, Position) {
    let session = h.ctx.session.lock().await;
    (session.active, session.position.clone().unwrap())
}

#[tokio::test]
async fn manual_sell_stops_after_one_tick() {
    let h = harness(
        Some(position(100.0)),
        MockLedger::new().with_holding(0),
        Arc::new(FixedOracle(200.0)),
        Some(Pubkey::new_unique()),
    );

    let monitor = PositionMonitor::new(h.ctx.clone(), 0);
    tokio::time::timeout(Duration::from_secs(2), monitor.run())
        .await
        .expect("monitor should exit on manual sell");

    assert_eq!(h.ledger.holding_calls(), 1);
    assert_eq!(h.ledger.fetch_calls(), 0);

    let (active, position) = current(&h).await;
    assert!(!active);
    assert!(position.manual_sell_detected);
    assert!(h.store.load().unwrap().manual_sell_detected);
}

#[tokio::test]
async fn holding_query_failure_is_not_a_manual_sell() {
    let ledger = MockLedger::new();
    ledger.set_holding(Err(FetchError::RpcUnavailable("connection refused".into())));
    let h = harness(
        Some(position(100.0)),
        ledger,
        Arc::new(FixedOracle(200.0)),
        Some(Pubkey::new_unique()),
    );

    let monitor = PositionMonitor::new(h.ctx.clone(), 0);
    assert!(monitor.tick().await.is_err());

    let (active, position) = current(&h).await;
    assert!(active);
    assert!(!position.manual_sell_detected);
}

#[tokio::test]
async fn tick_marks_position_and_persists() {
    let pos = position(100.0);
    // 1,000,000 tokens against 37.5 SOL: 0.0000375 SOL, $0.0075 at $200.
    let ledger = MockLedger::new()
        .with_account(pos.bonding_curve(), curve_blob(1_000_000_000_000, 37_500_000_000))
        .with_holding(100_000_000);
    let h = harness(
        Some(pos),
        ledger,
        Arc::new(FixedOracle(200.0)),
        Some(Pubkey::new_unique()),
    );

    let monitor = PositionMonitor::new(h.ctx.clone(), 0);
    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Updated);

    let (active, position) = current(&h).await;
    assert!(active);
    assert!((position.current_price_usd - 0.0075).abs() < 1e-12);
    assert!((position.pnl_percent - 25.0).abs() < 1e-9);
    assert!((position.tp_progress - 50.0).abs() < 1e-9);
    assert!((position.position_value_usd - 0.75).abs() < 1e-9);
    assert!((position.pnl_usd - 0.15).abs() < 1e-9);
    assert_eq!(position.bonding_curve_sol, 37.5);

    assert_eq!(h.store.load().unwrap(), position);
}

#[tokio::test]
async fn undecodable_curve_skips_update() {
    let pos = position(100.0);
    let before = pos.clone();
    let ledger = MockLedger::new().with_account(pos.bonding_curve(), curve_blob(0, 37_500_000_000));
    let h = harness(Some(pos), ledger, Arc::new(FixedOracle(200.0)), None);

    let monitor = PositionMonitor::new(h.ctx.clone(), 0);
    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::NoPrice);

    let (active, position) = current(&h).await;
    assert!(active);
    assert_eq!(position, before);
    assert!(h.store.load().is_none());
    assert_eq!(h.ledger.holding_calls(), 0);
}

#[tokio::test]
async fn oracle_outage_still_completes_tick() {
    let pos = position(100.0);
    let ledger = MockLedger::new()
        .with_account(pos.bonding_curve(), curve_blob(1_000_000_000_000, 30_000_000_000));
    let oracle = CoinGeckoOracle::new(
        "http://127.0.0.1:1/price".to_string(),
        Duration::from_millis(500),
        150.0,
    )
    .unwrap();
    let h = harness(Some(pos), ledger, Arc::new(oracle), None);

    let monitor = PositionMonitor::new(h.ctx.clone(), 0);
    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Updated);

    let (_, position) = current(&h).await;
    assert!((position.current_price_usd - 0.000_03 * 150.0).abs() < 1e-12);
}

#[tokio::test]
async fn fetch_failures_do_not_end_monitoring() {
    let pos = position(100.0);
    let curve = pos.bonding_curve();
    let ledger = MockLedger::new().with_holding(100_000_000);
    ledger.set_fetch_error(Some(FetchError::RpcUnavailable("timed out".into())));
    let h = harness(
        Some(pos),
        ledger,
        Arc::new(FixedOracle(200.0)),
        Some(Pubkey::new_unique()),
    );

    let handle = tokio::spawn(PositionMonitor::new(h.ctx.clone(), 0).run());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished());
    assert!(h.ledger.fetch_calls() >= 2);

    h.ledger.set_fetch_error(None);
    h.ledger
        .set_account(curve, curve_blob(1_000_000_000_000, 45_000_000_000));
    tokio::time::sleep(Duration::from_millis(100)).await;
    let (_, position) = current(&h).await;
    assert!((position.pnl_percent - 50.0).abs() < 1e-9);
    assert!((position.tp_progress - 100.0).abs() < 1e-9);

    h.ctx.session.lock().await.active = false;
    h.ctx.wake.notify_one();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("monitor should exit after stop")
        .unwrap();
}

#[tokio::test]
async fn waits_for_position_then_exits_when_superseded() {
    let h = harness(None, MockLedger::new(), Arc::new(FixedOracle(200.0)), None);

    let monitor = PositionMonitor::new(h.ctx.clone(), 0);
    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Waiting);

    h.ctx.session.lock().await.run_id = 1;
    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Inactive);
    assert_eq!(h.ledger.fetch_calls(), 0);
}
