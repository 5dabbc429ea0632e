//! typed failures returned by the core. recoverable conditions are scoped to
//! a single account or obligation so the caller can log, skip and continue.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LendingError {
    /// the supplied buffer does not match the fixed account layout size
    #[error("account data is {actual} bytes, layout requires {expected}")]
    InvalidAccountSize { expected: usize, actual: usize },

    /// the account's version byte is not one this decoder understands
    #[error("unsupported account version {0}")]
    UnsupportedVersion(u8),

    /// instruction data was empty, truncated, oversized or carried an
    /// unknown opcode
    #[error("invalid instruction data")]
    InvalidInstructionData,

    /// a deposit or borrow references a reserve with no oracle entry,
    /// the whole evaluation for that obligation fails
    #[error("no oracle entry for reserve {0}")]
    MissingOracle(Pubkey),

    /// a deposit or borrow references a reserve absent from the supplied
    /// reserve set
    #[error("reserve {0} missing from supplied reserve set")]
    MissingReserve(Pubkey),

    #[error("math operation overflowed")]
    MathOverflow,
}
