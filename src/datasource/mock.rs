//! Mock data sources for testing without network calls.

use super::{FetchError, LedgerSource, PriceOracle};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory ledger with adjustable accounts and wallet holding.
#[derive(Debug)]
pub struct MockLedger {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    holding: Mutex<Result<u64, FetchError>>,
    fetch_error: Mutex<Option<FetchError>>,
    fetch_calls: AtomicUsize,
    holding_calls: AtomicUsize,
}

impl MockLedger {
    /// Create an empty ledger. The wallet holds nothing until `with_holding` is called.
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            holding: Mutex::new(Ok(0)),
            fetch_error: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            holding_calls: AtomicUsize::new(0),
        }
    }

    /// Add an account to the ledger.
    pub fn with_account(self, address: Pubkey, data: Vec<u8>) -> Self {
        self.set_account(address, data);
        self
    }

    /// Set the wallet holding returned by `token_holding`.
    pub fn with_holding(self, amount: u64) -> Self {
        self.set_holding(Ok(amount));
        self
    }

    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        lock(&self.accounts).insert(address, data);
    }

    pub fn set_holding(&self, holding: Result<u64, FetchError>) {
        *lock(&self.holding) = holding;
    }

    /// Make every `fetch_raw` fail with `err` until cleared with `None`.
    pub fn set_fetch_error(&self, err: Option<FetchError>) {
        *lock(&self.fetch_error) = err;
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn holding_calls(&self) -> usize {
        self.holding_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerSource for MockLedger {
    async fn fetch_raw(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fetch_error).clone() {
            return Err(err);
        }
        lock(&self.accounts)
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(address.to_string()))
    }

    async fn token_holding(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<u64, FetchError> {
        self.holding_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.holding).clone()
    }
}

/// Oracle returning a constant rate.
#[derive(Debug, Clone, Copy)]
pub struct FixedOracle(pub f64);

#[async_trait]
impl PriceOracle for FixedOracle {
    async fn sol_usd(&self) -> f64 {
        self.0
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ledger_fetch_raw() {
        let addr = Pubkey::new_unique();
        let ledger = MockLedger::new().with_account(addr, vec![1, 2, 3]);

        assert_eq!(ledger.fetch_raw(&addr).await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            ledger.fetch_raw(&Pubkey::new_unique()).await,
            Err(FetchError::NotFound(_))
        ));
        assert_eq!(ledger.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_ledger_injected_failure() {
        let addr = Pubkey::new_unique();
        let ledger = MockLedger::new().with_account(addr, vec![1]);
        ledger.set_fetch_error(Some(FetchError::RpcUnavailable("down".to_string())));
        assert!(ledger.fetch_raw(&addr).await.is_err());

        ledger.set_fetch_error(None);
        assert!(ledger.fetch_raw(&addr).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_ledger_holding() {
        let ledger = MockLedger::new().with_holding(42);
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(ledger.token_holding(&owner, &mint).await.unwrap(), 42);

        ledger.set_holding(Ok(0));
        assert_eq!(ledger.token_holding(&owner, &mint).await.unwrap(), 0);
        assert_eq!(ledger.holding_calls(), 2);
    }
}
