//! typed views over the lending program's fixed-layout accounts. decoding is
//! a pure function of the bytes: a buffer either matches the versioned layout
//! exactly or the account is rejected, and padding bytes are never
//! interpreted.

pub mod obligation;
pub mod reserve;

pub use obligation::{Obligation, ObligationCollateral, ObligationLiquidity, OBLIGATION_LEN};
pub use reserve::{
    Reserve, ReserveCollateral, ReserveConfig, ReserveFees, ReserveLiquidity, RESERVE_LEN,
};

use crate::math::Decimal;

/// account layout version understood by this decoder
pub const PROGRAM_VERSION: u8 = 1;

/// byte offset of the lending market key in both account layouts,
/// version (1) + last update slot (8) + stale flag (1). program-account
/// scans memcmp on this offset.
pub const LENDING_MARKET_OFFSET: usize = 10;

/// refresh bookkeeping shared by both account kinds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LastUpdate {
    pub slot: u64,
    pub stale: bool,
}

pub(crate) fn unpack_decimal(src: &[u8; 16]) -> Decimal {
    Decimal::from_scaled_val(u128::from_le_bytes(*src))
}

pub(crate) fn unpack_bool(src: &[u8; 1]) -> bool {
    src[0] != 0
}
