//! Solana JSON-RPC implementation of `LedgerSource`.

use super::{FetchError, LedgerSource};
use async_trait::async_trait;
use solana_account_decoder::UiAccountData;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Ledger reads over a shared nonblocking RPC client.
#[derive(Clone)]
pub struct SolanaRpcSource {
    client: Arc<RpcClient>,
}

impl SolanaRpcSource {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    /// Connect with `confirmed` commitment.
    pub fn from_url(rpc_url: String) -> Self {
        Self::new(Arc::new(RpcClient::new_with_commitment(
            rpc_url,
            CommitmentConfig::confirmed(),
        )))
    }

    pub fn client(&self) -> Arc<RpcClient> {
        self.client.clone()
    }
}

#[async_trait]
impl LedgerSource for SolanaRpcSource {
    async fn fetch_raw(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching account {}", address);

        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(classify)?;

        match response.value {
            Some(account) if !account.data.is_empty() => Ok(account.data),
            _ => Err(FetchError::NotFound(address.to_string())),
        }
    }

    async fn token_holding(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, FetchError> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::Mint(*mint))
            .await
            .map_err(classify)?;

        let mut total: u64 = 0;
        for keyed in &accounts {
            let amount = match &keyed.account.data {
                UiAccountData::Json(parsed) => parse_token_amount(&parsed.parsed)?,
                _ => {
                    return Err(FetchError::Transient(format!(
                        "token account {} was not returned as jsonParsed",
                        keyed.pubkey
                    )))
                }
            };
            total = total.saturating_add(amount);
        }

        debug!(
            "Wallet {} holds {} base units of {} across {} accounts",
            owner,
            total,
            mint,
            accounts.len()
        );
        Ok(total)
    }
}

/// Read `info.tokenAmount.amount` from a jsonParsed SPL token account.
fn parse_token_amount(parsed: &serde_json::Value) -> Result<u64, FetchError> {
    parsed
        .pointer("/info/tokenAmount/amount")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FetchError::Transient("Missing tokenAmount.amount field".to_string()))?
        .parse::<u64>()
        .map_err(|e| FetchError::Transient(format!("Invalid token amount: {}", e)))
}

fn classify(err: ClientError) -> FetchError {
    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            FetchError::RpcUnavailable(err.to_string())
        }
        _ => FetchError::Transient(err.to_string()),
    }
}
