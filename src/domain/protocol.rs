//! Pump.fun program constants and deterministic address derivation.

use sha2::{Digest, Sha256};
use solana_sdk::{pubkey, pubkey::Pubkey};

pub const PUMP_FUN_PROGRAM: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");
pub const PUMP_FUN_GLOBAL: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");
pub const PUMP_FUN_FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");
pub const PUMP_FUN_EVENT_AUTHORITY: Pubkey =
    pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");
pub const TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

/// Decimal places of the native asset (lamports per SOL).
pub const SOL_DECIMALS: u32 = 9;

/// Decimal places of every Pump.fun mint.
pub const TOKEN_DECIMALS: u32 = 6;

/// Fixed stop-loss threshold relative to the entry price.
pub const STOP_LOSS_PERCENT: f64 = -20.0;

/// Protocol fee charged on curve trades, in basis points.
pub const FEE_BASIS_POINTS: u64 = 125;

/// Derive the bonding-curve account for a mint.
pub fn bonding_curve_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[BONDING_CURVE_SEED, mint.as_ref()], &PUMP_FUN_PROGRAM).0
}

/// Derive the associated token account of `owner` for `mint`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM,
    )
    .0
}

/// Anchor account discriminator: first 8 bytes of `sha256("account:<Name>")`.
pub fn account_discriminator(account_name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{}", account_name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonding_curve_address_is_deterministic_pda() {
        let mint = Pubkey::new_unique();
        let first = bonding_curve_address(&mint);
        let second = bonding_curve_address(&mint);
        assert_eq!(first, second);
        assert!(!first.is_on_curve());
        assert_ne!(first, bonding_curve_address(&Pubkey::new_unique()));
    }

    #[test]
    fn test_associated_token_address_depends_on_owner() {
        let mint = Pubkey::new_unique();
        let a = associated_token_address(&Pubkey::new_unique(), &mint);
        let b = associated_token_address(&Pubkey::new_unique(), &mint);
        assert_ne!(a, b);
    }

    #[test]
    fn test_account_discriminator_matches_sha256_prefix() {
        let disc = account_discriminator("BondingCurve");
        let digest = Sha256::digest(b"account:BondingCurve");
        assert_eq!(&disc[..], &digest[..8]);
        assert_ne!(disc, account_discriminator("Global"));
    }
}
