//! Bonding-curve account decoder.
//!
//! Reads the two virtual reserve fields at fixed offsets from the account data and
//! derives the spot price `sol_reserves / token_reserves`. The offsets come from a single
//! `CurveLayout`; nothing here scans or guesses.

use crate::domain::protocol::{
    account_discriminator, FEE_BASIS_POINTS, SOL_DECIMALS, TOKEN_DECIMALS,
};
use thiserror::Error;

/// Byte layout of a bonding-curve account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveLayout {
    /// Expected leading 8 bytes, or `None` to skip the check.
    pub discriminator: Option<[u8; 8]>,
    pub token_reserves_offset: usize,
    pub sol_reserves_offset: usize,
    pub token_decimals: u32,
    pub sol_decimals: u32,
}

impl CurveLayout {
    /// Pump.fun `BondingCurve` account:
    ///
    /// | offset | field                  |
    /// |--------|------------------------|
    /// | 0      | discriminator `[u8; 8]`|
    /// | 8      | virtual_token_reserves |
    /// | 16     | virtual_sol_reserves   |
    /// | 24     | real_token_reserves    |
    /// | 32     | real_sol_reserves      |
    /// | 40     | token_total_supply     |
    /// | 48     | complete `bool`        |
    pub fn pump_fun() -> Self {
        CurveLayout {
            discriminator: Some(account_discriminator("BondingCurve")),
            token_reserves_offset: 8,
            sol_reserves_offset: 16,
            token_decimals: TOKEN_DECIMALS,
            sol_decimals: SOL_DECIMALS,
        }
    }

    /// Smallest account that contains every field this layout reads.
    pub fn min_len(&self) -> usize {
        // Saturates so an absurd offset rejects every blob as too short.
        let reserves_end = self
            .token_reserves_offset
            .max(self.sol_reserves_offset)
            .saturating_add(8);
        match self.discriminator {
            Some(_) => reserves_end.max(8),
            None => reserves_end,
        }
    }
}

impl Default for CurveLayout {
    fn default() -> Self {
        Self::pump_fun()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("account data too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
    #[error("bonding curve has zero token reserves")]
    ZeroReserves,
    #[error("unknown account layout, discriminator {found}")]
    UnknownLayout { found: String },
}

/// Reserve fields in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReserves {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
}

impl RawReserves {
    /// Tokens (base units) received for `lamports_in` after the protocol fee, using the
    /// constant-product formula on the virtual reserves.
    pub fn tokens_out(&self, lamports_in: u64) -> u64 {
        if lamports_in == 0 || self.virtual_token_reserves == 0 {
            return 0;
        }
        let input = lamports_in as u128 * 10_000 / (10_000 + FEE_BASIS_POINTS as u128);
        let denominator = self.virtual_sol_reserves as u128 + input;
        let out = input * self.virtual_token_reserves as u128 / denominator;
        u64::try_from(out).unwrap_or(u64::MAX)
    }
}

/// Decoded spot quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveQuote {
    /// Price of one token in SOL.
    pub price_sol: f64,
    /// Virtual SOL reserves in SOL.
    pub sol_reserves: f64,
    /// Virtual token reserves in UI units.
    pub token_reserves: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CurveDecoder {
    layout: CurveLayout,
}

impl CurveDecoder {
    pub fn new(layout: CurveLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &CurveLayout {
        &self.layout
    }

    /// Validate the blob and read both reserve fields.
    pub fn read_reserves(&self, data: &[u8]) -> Result<RawReserves, DecodeError> {
        let min = self.layout.min_len();
        if data.len() < min {
            return Err(DecodeError::TooShort {
                len: data.len(),
                min,
            });
        }

        if let Some(expected) = self.layout.discriminator {
            if data[..8] != expected {
                return Err(DecodeError::UnknownLayout {
                    found: hex::encode(&data[..8]),
                });
            }
        }

        Ok(RawReserves {
            virtual_token_reserves: read_u64_le(data, self.layout.token_reserves_offset),
            virtual_sol_reserves: read_u64_le(data, self.layout.sol_reserves_offset),
        })
    }

    /// Decode the spot price of the curve.
    pub fn decode(&self, data: &[u8]) -> Result<CurveQuote, DecodeError> {
        let raw = self.read_reserves(data)?;
        if raw.virtual_token_reserves == 0 {
            return Err(DecodeError::ZeroReserves);
        }

        let token_reserves =
            raw.virtual_token_reserves as f64 / 10f64.powi(self.layout.token_decimals as i32);
        let sol_reserves =
            raw.virtual_sol_reserves as f64 / 10f64.powi(self.layout.sol_decimals as i32);

        Ok(CurveQuote {
            price_sol: sol_reserves / token_reserves,
            sol_reserves,
            token_reserves,
        })
    }
}

// Callers check `min_len` first.
fn read_u64_le(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}
