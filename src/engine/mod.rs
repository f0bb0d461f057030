//! Pure computation: account decoding and position valuation. No I/O.

pub mod curve;
pub mod pnl;

pub use curve::{CurveDecoder, CurveLayout, CurveQuote, DecodeError, RawReserves};
pub use pnl::{mark_position, price_targets, tp_progress, value_position, Valuation};
