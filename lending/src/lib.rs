//! pure lending-market core used by the liquidator service.
//!
//! everything in this crate is a synchronous function of its inputs: account
//! buffers are decoded into typed state, obligation health is recomputed from
//! that state plus oracle snapshots, a repay/withdraw pair is selected, and
//! the protocol instructions are encoded byte-for-byte. no network access, no
//! shared mutable state; callers are free to process obligations in parallel.

pub mod error;
pub mod health;
pub mod instruction;
pub mod math;
pub mod oracle;
pub mod select;
pub mod state;

pub use error::LendingError;
