use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Signing keypair loaded from a base58 secret.
#[derive(Clone)]
pub struct Wallet(Arc<Keypair>);

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("private key is not valid base58")]
    InvalidBase58,
    #[error("private key is not a valid keypair: {0}")]
    InvalidKeypair(String),
}

impl Wallet {
    pub fn new(keypair: Keypair) -> Self {
        Wallet(Arc::new(keypair))
    }

    /// Parse a base58-encoded 64-byte keypair (the solana-keygen / wallet export format).
    pub fn from_base58(secret: &str) -> Result<Self, WalletError> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|_| WalletError::InvalidBase58)?;
        let keypair =
            Keypair::from_bytes(&bytes).map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;
        Ok(Wallet::new(keypair))
    }

    pub fn pubkey(&self) -> Pubkey {
        self.0.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.0
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wallet({})", self.pubkey())
    }
}
