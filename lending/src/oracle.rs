//! oracle price snapshot consumed by the health calculator. one entry per
//! reserve, produced fresh each evaluation cycle by the price-feed client.

use solana_sdk::pubkey::Pubkey;

use crate::math::Decimal;

#[derive(Clone, Debug, PartialEq)]
pub struct TokenOracle {
    /// reserve this snapshot prices
    pub reserve_address: Pubkey,
    /// quoted market price for one whole token
    pub price: Decimal,
    /// token mint decimals, market values divide by 10^decimals
    pub decimals: u8,
    pub symbol: String,
    pub mint_address: Pubkey,
}
