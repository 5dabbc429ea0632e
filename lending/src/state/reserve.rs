//! reserve account decoding and per-reserve rate helpers

use arrayref::{array_ref, array_refs};
use solana_sdk::pubkey::Pubkey;

use crate::error::LendingError;
use crate::math::Decimal;
use crate::state::{unpack_bool, unpack_decimal, LastUpdate, PROGRAM_VERSION};

/// fixed byte length of a reserve account
pub const RESERVE_LEN: usize = 619;

/// a single asset's pool within a lending market
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reserve {
    pub version: u8,
    pub last_update: LastUpdate,
    pub lending_market: Pubkey,
    pub liquidity: ReserveLiquidity,
    pub collateral: ReserveCollateral,
    pub config: ReserveConfig,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveLiquidity {
    pub mint_pubkey: Pubkey,
    pub mint_decimals: u8,
    pub supply_pubkey: Pubkey,
    pub pyth_oracle_pubkey: Pubkey,
    pub switchboard_oracle_pubkey: Pubkey,
    pub available_amount: u64,
    pub borrowed_amount_wads: Decimal,
    /// monotonically non-decreasing interest accumulator
    pub cumulative_borrow_rate_wads: Decimal,
    pub market_price: Decimal,
    pub accumulated_protocol_fees_wads: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveCollateral {
    pub mint_pubkey: Pubkey,
    pub mint_total_supply: u64,
    pub supply_pubkey: Pubkey,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveConfig {
    pub optimal_utilization_rate: u8,
    /// integer percent, 0-100
    pub loan_to_value_ratio: u8,
    pub liquidation_bonus: u8,
    /// integer percent, 0-100
    pub liquidation_threshold: u8,
    pub min_borrow_rate: u8,
    pub optimal_borrow_rate: u8,
    pub max_borrow_rate: u8,
    pub fees: ReserveFees,
    pub deposit_limit: u64,
    pub borrow_limit: u64,
    pub fee_receiver: Pubkey,
    pub protocol_liquidation_fee: u8,
    pub protocol_take_rate: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveFees {
    pub borrow_fee_wad: u64,
    pub flash_loan_fee_wad: u64,
    pub host_fee_percentage: u8,
}

impl Reserve {
    /// decode a reserve from raw account data. fails unless the buffer is
    /// exactly [`RESERVE_LEN`] bytes and carries a supported version byte.
    pub fn unpack(input: &[u8]) -> Result<Reserve, LendingError> {
        if input.len() != RESERVE_LEN {
            return Err(LendingError::InvalidAccountSize {
                expected: RESERVE_LEN,
                actual: input.len(),
            });
        }
        let input = array_ref![input, 0, RESERVE_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            last_update_slot,
            last_update_stale,
            lending_market,
            liquidity_mint,
            liquidity_mint_decimals,
            liquidity_supply,
            liquidity_pyth_oracle,
            liquidity_switchboard_oracle,
            liquidity_available_amount,
            liquidity_borrowed_amount_wads,
            liquidity_cumulative_borrow_rate_wads,
            liquidity_market_price,
            collateral_mint,
            collateral_mint_total_supply,
            collateral_supply,
            optimal_utilization_rate,
            loan_to_value_ratio,
            liquidation_bonus,
            liquidation_threshold,
            min_borrow_rate,
            optimal_borrow_rate,
            max_borrow_rate,
            borrow_fee_wad,
            flash_loan_fee_wad,
            host_fee_percentage,
            deposit_limit,
            borrow_limit,
            fee_receiver,
            protocol_liquidation_fee,
            protocol_take_rate,
            accumulated_protocol_fees_wads,
            _padding,
        ) = array_refs![
            input, 1, 8, 1, 32, 32, 1, 32, 32, 32, 8, 16, 16, 16, 32, 8, 32, 1, 1, 1, 1, 1, 1, 1,
            8, 8, 1, 8, 8, 32, 1, 1, 16, 230
        ];

        let version = version[0];
        if version != PROGRAM_VERSION {
            return Err(LendingError::UnsupportedVersion(version));
        }

        Ok(Reserve {
            version,
            last_update: LastUpdate {
                slot: u64::from_le_bytes(*last_update_slot),
                stale: unpack_bool(last_update_stale),
            },
            lending_market: Pubkey::new_from_array(*lending_market),
            liquidity: ReserveLiquidity {
                mint_pubkey: Pubkey::new_from_array(*liquidity_mint),
                mint_decimals: liquidity_mint_decimals[0],
                supply_pubkey: Pubkey::new_from_array(*liquidity_supply),
                pyth_oracle_pubkey: Pubkey::new_from_array(*liquidity_pyth_oracle),
                switchboard_oracle_pubkey: Pubkey::new_from_array(*liquidity_switchboard_oracle),
                available_amount: u64::from_le_bytes(*liquidity_available_amount),
                borrowed_amount_wads: unpack_decimal(liquidity_borrowed_amount_wads),
                cumulative_borrow_rate_wads: unpack_decimal(liquidity_cumulative_borrow_rate_wads),
                market_price: unpack_decimal(liquidity_market_price),
                accumulated_protocol_fees_wads: unpack_decimal(accumulated_protocol_fees_wads),
            },
            collateral: ReserveCollateral {
                mint_pubkey: Pubkey::new_from_array(*collateral_mint),
                mint_total_supply: u64::from_le_bytes(*collateral_mint_total_supply),
                supply_pubkey: Pubkey::new_from_array(*collateral_supply),
            },
            config: ReserveConfig {
                optimal_utilization_rate: optimal_utilization_rate[0],
                loan_to_value_ratio: loan_to_value_ratio[0],
                liquidation_bonus: liquidation_bonus[0],
                liquidation_threshold: liquidation_threshold[0],
                min_borrow_rate: min_borrow_rate[0],
                optimal_borrow_rate: optimal_borrow_rate[0],
                max_borrow_rate: max_borrow_rate[0],
                fees: ReserveFees {
                    borrow_fee_wad: u64::from_le_bytes(*borrow_fee_wad),
                    flash_loan_fee_wad: u64::from_le_bytes(*flash_loan_fee_wad),
                    host_fee_percentage: host_fee_percentage[0],
                },
                deposit_limit: u64::from_le_bytes(*deposit_limit),
                borrow_limit: u64::from_le_bytes(*borrow_limit),
                fee_receiver: Pubkey::new_from_array(*fee_receiver),
                protocol_liquidation_fee: protocol_liquidation_fee[0],
                protocol_take_rate: protocol_take_rate[0],
            },
        })
    }

    /// collateral-token to liquidity exchange rate,
    /// `mint_total_supply * WAD / (available * WAD + borrowed_wads)`.
    /// exactly 1 wad while the reserve is bootstrapping (no collateral
    /// minted yet, or no liquidity on either side).
    pub fn collateral_exchange_rate(&self) -> Result<Decimal, LendingError> {
        let total_liquidity = Decimal::from(self.liquidity.available_amount)
            .try_add(self.liquidity.borrowed_amount_wads)?;
        if self.collateral.mint_total_supply == 0 || total_liquidity.is_zero() {
            return Ok(Decimal::one());
        }
        Decimal::from(self.collateral.mint_total_supply).try_div(total_liquidity)
    }

    /// maximum borrow fraction of a deposit's value
    pub fn loan_to_value_rate(&self) -> Decimal {
        Decimal::from_percent(self.config.loan_to_value_ratio)
    }

    /// fraction of a deposit's value beyond which the position is
    /// liquidatable
    pub fn liquidation_threshold_rate(&self) -> Decimal {
        Decimal::from_percent(self.config.liquidation_threshold)
    }
}
