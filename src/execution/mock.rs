//! Mock buy submitter for testing without a ledger.

use super::{BuyFill, BuyOrder, BuySubmitter, SubmitError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every order and answers with a preset result.
#[derive(Debug)]
pub struct MockBuySubmitter {
    result: Mutex<Result<BuyFill, SubmitError>>,
    orders: Mutex<Vec<BuyOrder>>,
}

impl MockBuySubmitter {
    /// Every buy succeeds with `signature` and `tokens_received`.
    pub fn filling(signature: &str, tokens_received: f64) -> Self {
        Self::with_result(Ok(BuyFill {
            signature: signature.to_string(),
            tokens_received: Some(tokens_received),
        }))
    }

    /// Every buy fails with `reason`.
    pub fn rejecting(reason: &str) -> Self {
        Self::with_result(Err(SubmitError::Rejected(reason.to_string())))
    }

    pub fn with_result(result: Result<BuyFill, SubmitError>) -> Self {
        Self {
            result: Mutex::new(result),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn orders(&self) -> Vec<BuyOrder> {
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl BuySubmitter for MockBuySubmitter {
    async fn buy(&self, order: &BuyOrder) -> Result<BuyFill, SubmitError> {
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(order.clone());
        self.result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
