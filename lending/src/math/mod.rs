//! wad-scaled fixed-point arithmetic

pub mod decimal;
pub mod uint;

pub use decimal::{Decimal, WAD};
pub use uint::U192;
